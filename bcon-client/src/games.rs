use crate::BconClient;
use anyhow::Result;
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewGame<'a> {
    name: &'a str,
    token_cost: i64,
}

/// Fields to change on a game. Unset fields are left out of the request.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_player: Option<String>,
}

impl BconClient {
    /// POST /games/create
    pub async fn create_game(&self, name: &str, token_cost: i64) -> Result<usize> {
        let body = NewGame { name, token_cost };
        self.send(Method::POST, "/games/create", Some(&body)).await
    }

    /// GET /games/:id
    pub async fn get_game(&self, id: &str) -> Result<usize> {
        self.fetch(&format!("/games/{}", id)).await
    }

    /// GET /games
    pub async fn get_all_games(&self) -> Result<usize> {
        self.fetch("/games").await
    }

    /// PUT /games/:id/update
    pub async fn update_game(&self, id: &str, update: &GameUpdate) -> Result<usize> {
        self.send(Method::PUT, &format!("/games/{}/update", id), Some(update))
            .await
    }

    pub async fn update_game_name(&self, id: &str, name: &str) -> Result<usize> {
        let update = GameUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.update_game(id, &update).await
    }

    pub async fn update_game_token_cost(&self, id: &str, token_cost: i64) -> Result<usize> {
        let update = GameUpdate {
            token_cost: Some(token_cost),
            ..Default::default()
        };
        self.update_game(id, &update).await
    }

    pub async fn update_game_top_player(&self, id: &str, player_id: &str) -> Result<usize> {
        let update = GameUpdate {
            top_player: Some(player_id.to_string()),
            ..Default::default()
        };
        self.update_game(id, &update).await
    }

    /// DELETE /games/:id/delete
    pub async fn delete_game(&self, id: &str) -> Result<usize> {
        self.send::<()>(Method::DELETE, &format!("/games/{}/delete", id), None)
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
    async fn test_create_game() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/games/create")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "Skee-Ball", "tokenCost": 2})))
            .with_status(200)
            .with_body(r#"{"game": {"_id": "g1", "name": "Skee-Ball", "tokenCost": 2}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let points = client.create_game("Skee-Ball", 2).await.unwrap();

        mock.assert_async().await;
        // game.^, game._id, game.name, game.tokenCost, game.$
        assert_eq!(points, 5);
        assert_eq!(client.store().get_point("game.tokencost").value, TagValue::Int(2));
    }

    #[tokio::test]
    async fn test_get_all_games() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/games")
            .with_status(200)
            .with_body(r#"{"games": [{"name": "Pinball"}, {"name": "Air Hockey"}]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.get_all_games().await.unwrap();

        let store = client.store();
        assert_eq!(store.get_point("games.length").value, TagValue::Int(2));
        assert_eq!(
            store.get_point("games.1.name").value,
            TagValue::from("Air Hockey")
        );
    }

    #[tokio::test]
    async fn test_update_game_sends_only_set_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/games/g1/update")
            .match_body(Matcher::Json(json!({"topPlayer": "p7"})))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.update_game_top_player("g1", "p7").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_and_delete_game_paths() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", "/games/g1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/games/g1/delete")
            .with_status(200)
            .with_body(r#"{"deleted": true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.get_game("g1").await.unwrap();
        client.delete_game("g1").await.unwrap();

        get.assert_async().await;
        delete.assert_async().await;
        assert_eq!(client.store().get_point("deleted").value, TagValue::Bool(true));
    }
}
