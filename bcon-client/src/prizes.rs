use crate::BconClient;
use anyhow::Result;
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPrize<'a> {
    name: &'a str,
    ticket_cost: i64,
    available_quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Redemption<'a> {
    player_id: &'a str,
}

/// Fields to change on a prize. Unset fields are left out of the request.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i64>,
}

impl BconClient {
    /// POST /prizes/create
    pub async fn create_prize(
        &self,
        name: &str,
        ticket_cost: i64,
        available_quantity: i64,
    ) -> Result<usize> {
        let body = NewPrize {
            name,
            ticket_cost,
            available_quantity,
        };
        self.send(Method::POST, "/prizes/create", Some(&body)).await
    }

    /// GET /prizes/:id
    pub async fn get_prize(&self, id: &str) -> Result<usize> {
        self.fetch(&format!("/prizes/{}", id)).await
    }

    /// GET /prizes
    pub async fn get_all_prizes(&self) -> Result<usize> {
        self.fetch("/prizes").await
    }

    /// PUT /prizes/:id/update
    pub async fn update_prize(&self, id: &str, update: &PrizeUpdate) -> Result<usize> {
        self.send(Method::PUT, &format!("/prizes/{}/update", id), Some(update))
            .await
    }

    pub async fn update_prize_name(&self, id: &str, name: &str) -> Result<usize> {
        let update = PrizeUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.update_prize(id, &update).await
    }

    pub async fn update_prize_description(&self, id: &str, description: &str) -> Result<usize> {
        let update = PrizeUpdate {
            description: Some(description.to_string()),
            ..Default::default()
        };
        self.update_prize(id, &update).await
    }

    pub async fn update_prize_ticket_cost(&self, id: &str, ticket_cost: i64) -> Result<usize> {
        let update = PrizeUpdate {
            ticket_cost: Some(ticket_cost),
            ..Default::default()
        };
        self.update_prize(id, &update).await
    }

    pub async fn update_prize_available_quantity(&self, id: &str, quantity: i64) -> Result<usize> {
        let update = PrizeUpdate {
            available_quantity: Some(quantity),
            ..Default::default()
        };
        self.update_prize(id, &update).await
    }

    /// POST /prizes/:id/redeem - Spend a player's tickets on a prize.
    pub async fn redeem_prize(&self, prize_id: &str, player_id: &str) -> Result<usize> {
        let body = Redemption { player_id };
        self.send(Method::POST, &format!("/prizes/{}/redeem", prize_id), Some(&body))
            .await
    }

    /// DELETE /prizes/:id/delete
    pub async fn delete_prize(&self, id: &str) -> Result<usize> {
        self.send::<()>(Method::DELETE, &format!("/prizes/{}/delete", id), None)
            .await
    }
}
