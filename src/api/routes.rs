use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState, approve_match, create_tournament, get_leaderboard, get_match_detail,
    get_office_stats, get_player_detail, get_tournament, record_match,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/offices/:office_id/leaderboard", get(get_leaderboard))
        .route("/api/offices/:office_id/stats", get(get_office_stats))
        .route("/api/offices/:office_id/players/:user_id", get(get_player_detail))
        .route("/api/offices/:office_id/matches", post(record_match))
        .route("/api/offices/:office_id/matches/:match_id", get(get_match_detail))
        .route("/api/offices/:office_id/tournaments", post(create_tournament))
        .route("/api/tournaments/:tournament_id", get(get_tournament))
        .route("/api/matches/:match_id/approve", post(approve_match))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AppConfig;
    use crate::database::{self, create_memory_pool, offices, setup::init_database, users};
    use crate::domain::UserId;
    use crate::services::server::build_state;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Seeded {
        router: Router,
        office_id: i64,
        admin: UserId,
        ada: UserId,
        bob: UserId,
    }

    fn seeded() -> Seeded {
        let pool = create_memory_pool().unwrap();
        let (office_id, admin, ada, bob) = {
            let conn = database::get_connection(&pool).unwrap();
            init_database(&conn).unwrap();
            let admin = users::insert_user(&conn, "admin", false).unwrap().id;
            let office = offices::insert_office(&conn, "Warsaw", admin).unwrap();
            let ada = users::insert_user(&conn, "ada", false).unwrap().id;
            let bob = users::insert_user(&conn, "bob", false).unwrap().id;
            offices::add_player(&conn, office.id, ada).unwrap();
            offices::add_player(&conn, office.id, bob).unwrap();
            (office.id, admin, ada, bob)
        };

        Seeded {
            router: create_router(build_state(pool, &AppConfig::new())),
            office_id,
            admin,
            ada,
            bob,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_logged_match_reaches_leaderboard_after_approval() {
        let s = seeded();

        let (status, logged) = send(
            &s.router,
            post(
                &format!("/api/offices/{}/matches", s.office_id),
                json!({ "creatorId": s.ada, "winners": [s.ada], "losers": [s.bob] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logged["state"], "pending");
        let match_id = logged["matchId"].as_i64().unwrap();

        let (_, board) = send(&s.router, get(&format!("/api/offices/{}/leaderboard", s.office_id))).await;
        assert_eq!(board["items"].as_array().unwrap().len(), 0);

        let (status, approved) = send(
            &s.router,
            post(&format!("/api/matches/{}/approve", match_id), json!({ "userId": s.bob })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["state"], "approved");

        let (_, board) = send(&s.router, get(&format!("/api/offices/{}/leaderboard", s.office_id))).await;
        assert_eq!(board["items"][0]["username"], "ada");
        assert_eq!(board["items"][0]["rating"], 432);
        assert_eq!(board["items"][1]["rating"], 368);

        let (status, detail) = send(
            &s.router,
            get(&format!("/api/offices/{}/matches/{}", s.office_id, match_id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["participants"][0]["pointsApplied"], 32);

        let (status, player) = send(
            &s.router,
            get(&format!("/api/offices/{}/players/{}", s.office_id, s.bob)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(player["rank"], 2);
        assert_eq!(player["opponents"][0]["username"], "ada");

        let (_, stats) = send(&s.router, get(&format!("/api/offices/{}/stats", s.office_id))).await;
        assert_eq!(stats["matchesPlayed"], 1);
        assert_eq!(stats["recordHolder"]["username"], "ada");
        assert_eq!(stats["playerCountDistribution"]["2"], 1);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let s = seeded();

        let (status, _) = send(&s.router, get(&format!("/api/offices/{}/players/999", s.office_id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&s.router, get("/api/tournaments/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&s.router, get("/api/offices/987654/leaderboard")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&s.router, get("/api/offices/987654/stats")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &s.router,
            post(
                &format!("/api/offices/{}/matches", s.office_id),
                json!({ "creatorId": s.ada, "winners": [s.ada], "losers": [] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, logged) = send(
            &s.router,
            post(
                &format!("/api/offices/{}/matches", s.office_id),
                json!({ "creatorId": s.admin, "winners": [s.ada], "losers": [s.bob] }),
            ),
        )
        .await;
        assert_eq!(logged["state"], "approved");
        let (status, _) = send(
            &s.router,
            post(
                &format!("/api/matches/{}/approve", logged["matchId"]),
                json!({ "userId": s.bob }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &s.router,
            post(
                &format!("/api/offices/{}/tournaments", s.office_id),
                json!({ "creatorId": s.ada, "name": "Cup", "participants": [s.ada, s.bob] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_and_read_tournament() {
        let s = seeded();

        let (status, created) = send(
            &s.router,
            post(
                &format!("/api/offices/{}/tournaments", s.office_id),
                json!({ "creatorId": s.admin, "name": "Cup", "participants": [s.ada, s.bob] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["playerCount"], 2);
        assert_eq!(created["rounds"].as_array().unwrap().len(), 1);
        assert_eq!(created["isActive"], true);

        let (status, read) = send(&s.router, get(&format!("/api/tournaments/{}", created["id"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["name"], "Cup");
        assert_eq!(read["rounds"][0][0]["participants"].as_array().unwrap().len(), 2);
    }
}
