use crate::BconClient;
use anyhow::Result;
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPlayer<'a> {
    player_id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    screen_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerStats<'a> {
    game_id: &'a str,
    tickets_earned: i64,
    high_score: i64,
}

/// Fields to change on a player. Unset fields are left out of the request.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<i64>,
}

impl BconClient {
    /// POST /players/create
    pub async fn create_player(
        &self,
        player_id: &str,
        first_name: &str,
        last_name: &str,
        screen_name: &str,
    ) -> Result<usize> {
        let body = NewPlayer {
            player_id,
            first_name,
            last_name,
            screen_name,
        };
        self.send(Method::POST, "/players/create", Some(&body)).await
    }

    /// GET /players/:id
    pub async fn get_player(&self, id: &str) -> Result<usize> {
        self.fetch(&format!("/players/{}", id)).await
    }

    /// GET /players
    pub async fn get_all_players(&self) -> Result<usize> {
        self.fetch("/players").await
    }

    /// PUT /players/:id/update
    pub async fn update_player(&self, id: &str, update: &PlayerUpdate) -> Result<usize> {
        self.send(Method::PUT, &format!("/players/{}/update", id), Some(update))
            .await
    }

    pub async fn update_player_id(&self, id: &str, new_id: &str) -> Result<usize> {
        let update = PlayerUpdate {
            player_id: Some(new_id.to_string()),
            ..Default::default()
        };
        self.update_player(id, &update).await
    }

    pub async fn update_player_name(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<usize> {
        let update = PlayerUpdate {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            ..Default::default()
        };
        self.update_player(id, &update).await
    }

    pub async fn update_player_screen_name(&self, id: &str, screen_name: &str) -> Result<usize> {
        let update = PlayerUpdate {
            screen_name: Some(screen_name.to_string()),
            ..Default::default()
        };
        self.update_player(id, &update).await
    }

    pub async fn update_player_tokens(&self, id: &str, tokens: i64) -> Result<usize> {
        let update = PlayerUpdate {
            tokens: Some(tokens),
            ..Default::default()
        };
        self.update_player(id, &update).await
    }

    pub async fn update_player_tickets(&self, id: &str, tickets: i64) -> Result<usize> {
        let update = PlayerUpdate {
            tickets: Some(tickets),
            ..Default::default()
        };
        self.update_player(id, &update).await
    }

    /// POST /players/:id/publishstats - Record the outcome of a play.
    pub async fn publish_player_stats(
        &self,
        id: &str,
        game_id: &str,
        tickets_earned: i64,
        high_score: i64,
    ) -> Result<usize> {
        let body = PlayerStats {
            game_id,
            tickets_earned,
            high_score,
        };
        self.send(Method::POST, &format!("/players/{}/publishstats", id), Some(&body))
            .await
    }

    /// DELETE /players/:id/delete
    pub async fn delete_player(&self, id: &str) -> Result<usize> {
        self.send::<()>(Method::DELETE, &format!("/players/{}/delete", id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::test_client;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tagbus::TagValue;

    #[tokio::test]
    async fn test_create_player() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/players/create")
            .match_body(Matcher::Json(json!({
                "playerId": "04a1b2c3",
                "firstName": "Ada",
                "lastName": "Byron",
                "screenName": "ADA"
            })))
            .with_status(200)
            .with_body(r#"{"player": {"playerId": "04a1b2c3", "tokens": 0, "tickets": 0}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client
            .create_player("04a1b2c3", "Ada", "Byron", "ADA")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            client.store().get_point("player.playerId").value,
            TagValue::from("04a1b2c3")
        );
    }

    #[tokio::test]
    async fn test_update_player_name_sends_both_names() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/players/p1/update")
            .match_body(Matcher::Json(json!({"firstName": "Grace", "lastName": "Hopper"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server.url());
        client
            .update_player_name("p1", "Grace", "Hopper")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_player_tickets() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/players/p1/update")
            .match_body(Matcher::Json(json!({"tickets": 120})))
            .with_status(200)
            .with_body(r#"{"player": {"tickets": 120}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.update_player_tickets("p1", 120).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            client.store().get_point("player.tickets").value,
            TagValue::Int(120)
        );
    }

    #[tokio::test]
    async fn test_publish_player_stats() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/players/p1/publishstats")
            .match_body(Matcher::Json(json!({
                "gameId": "g1",
                "ticketsEarned": 25,
                "highScore": 9001
            })))
            .with_status(200)
            .with_body(r#"{"newHighScore": true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client
            .publish_player_stats("p1", "g1", 25, 9001)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            client.store().get_point("newhighscore").value,
            TagValue::Bool(true)
        );
    }

    #[tokio::test]
    async fn test_delete_player_server_error_is_ingested() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/players/p1/delete")
            .with_status(500)
            .with_body(r#"{"error": "Database unavailable"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let points = client.delete_player("p1").await.unwrap();

        assert_eq!(points, 1);
    }
}
