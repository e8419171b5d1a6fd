use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::Serialize;
use std::sync::Arc;

use crate::api::models::{
    ApproveRequest, CreateTournamentRequest, LeaderboardEntry, LeaderboardResponse, MatchDetail,
    MatchStateResponse, OfficeStatsResponse, PairingSummary, PartnerSummary, PlayerDetail,
    PlayerSummary, RecordHolder, RecordMatchRequest, TournamentResponse,
};
use crate::config::settings::AppConfig;
use crate::domain::{MatchId, OfficeId, TournamentId, UserId};
use crate::errors::LadderError;
use crate::processing::{OfficeProcessor, Pairing};
use crate::services::ladder::LadderService;

pub struct AppState {
    pub processor: Arc<OfficeProcessor>,
    pub ladder: LadderService,
    pub config: AppConfig,
}

/// Run store and replay work off the async workers and render the outcome as JSON
async fn run_blocking<T, F>(state: Arc<AppState>, status_for: fn(&anyhow::Error) -> StatusCode, work: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&AppState) -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&state)).await {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(err)) => {
            let status = status_for(&err);
            if status.is_server_error() {
                error!("Request failed: {:#}", err);
            }
            (status, format!("{:#}", err)).into_response()
        }
        Err(err) => {
            error!("Blocking task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error").into_response()
        }
    }
}

/// Reads only fail on missing rows or bad stored data
pub fn read_status(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<LadderError>() {
        Some(LadderError::NotFound { .. }) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn write_status(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<LadderError>() {
        Some(LadderError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Some(LadderError::MatchNotPending(_)) | Some(LadderError::AlreadyApproved { .. }) => {
            StatusCode::CONFLICT
        }
        Some(LadderError::NotOfficeAdmin(_)) => StatusCode::FORBIDDEN,
        Some(e) if e.is_precondition() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(office_id): Path<OfficeId>,
) -> impl IntoResponse {
    run_blocking(state, read_status, move |state| {
        let snapshot = state.processor.process(office_id)?;
        let items = snapshot
            .ranked_players()
            .into_iter()
            .enumerate()
            .map(|(i, player)| LeaderboardEntry::new(i + 1, player))
            .collect();

        Ok(LeaderboardResponse {
            office_id,
            processed_at: snapshot.processed_at,
            items,
        })
    })
    .await
}

pub async fn get_office_stats(
    State(state): State<Arc<AppState>>,
    Path(office_id): Path<OfficeId>,
) -> impl IntoResponse {
    run_blocking(state, read_status, move |state| {
        let snapshot = state.processor.process(office_id)?;
        let tournaments = state.processor.office_tournaments(office_id)?;

        Ok(OfficeStatsResponse {
            office_id,
            matches_played: snapshot.matches_played(),
            ranked_players: snapshot.ranked_players().len(),
            highest_ranked: snapshot.highest_ranked_player().map(PlayerSummary::from),
            record_holder: snapshot.record_holder().map(|p| RecordHolder {
                user_id: p.user_id,
                username: p.username.clone(),
                record_rating: p.record_rating,
                record_rating_date: p.record_rating_date,
            }),
            most_played: snapshot.most_played_player().map(PlayerSummary::from),
            player_count_distribution: snapshot.player_count_distribution(),
            most_common_pairing: snapshot.most_common_pairing().map(PairingSummary::from),
            most_common_opposing_pairing: snapshot
                .most_common_opposing_pairing()
                .map(PairingSummary::from),
            tournaments: tournaments.into_iter().map(Into::into).collect(),
        })
    })
    .await
}

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path((office_id, user_id)): Path<(OfficeId, UserId)>,
) -> impl IntoResponse {
    run_blocking(state, read_status, move |state| {
        let snapshot = state.processor.process(office_id)?;
        let player = snapshot
            .get_player(user_id)
            .ok_or_else(|| LadderError::not_found("player", user_id))?;
        let rank = snapshot
            .ranked_players()
            .iter()
            .position(|p| p.user_id == user_id)
            .map(|i| i + 1);
        let partners = |pairings: Vec<Pairing>| -> Vec<PartnerSummary> {
            pairings
                .iter()
                .map(|pairing| PartnerSummary::from_pairing(pairing, user_id))
                .collect()
        };

        Ok(PlayerDetail {
            user_id,
            username: player.username.clone(),
            rank,
            rating: player.rating,
            win_count: player.win_count,
            loss_count: player.loss_count,
            win_percentage: player.win_percentage(),
            matches_played: player.matches_played(),
            record_rating: player.record_rating,
            record_rating_date: player.record_rating_date,
            is_active: player.is_active,
            teammates: partners(snapshot.pairings_for_player(user_id)),
            opponents: partners(snapshot.opponents_for_player(user_id)),
        })
    })
    .await
}

pub async fn get_match_detail(
    State(state): State<Arc<AppState>>,
    Path((office_id, match_id)): Path<(OfficeId, MatchId)>,
) -> impl IntoResponse {
    run_blocking(state, read_status, move |state| {
        let snapshot = state.processor.process(office_id)?;
        let processed = snapshot
            .get_match(match_id)
            .ok_or_else(|| LadderError::not_found("match", match_id))?;

        Ok(MatchDetail::new(match_id, processed))
    })
    .await
}

pub async fn get_tournament(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
) -> impl IntoResponse {
    run_blocking(state, read_status, move |state| {
        let view = state.processor.tournament(tournament_id)?;
        Ok(TournamentResponse::from(view))
    })
    .await
}

pub async fn approve_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<ApproveRequest>,
) -> impl IntoResponse {
    run_blocking(state, write_status, move |state| {
        let match_state = state.ladder.approve_match(request.user_id, match_id)?;
        Ok(MatchStateResponse {
            match_id,
            state: match_state,
        })
    })
    .await
}

pub async fn record_match(
    State(state): State<Arc<AppState>>,
    Path(office_id): Path<OfficeId>,
    Json(request): Json<RecordMatchRequest>,
) -> impl IntoResponse {
    run_blocking(state, write_status, move |state| {
        let (match_id, match_state) = state.ladder.record_match(
            request.creator_id,
            office_id,
            &request.winners,
            &request.losers,
            request.is_handicap,
        )?;
        Ok(MatchStateResponse {
            match_id,
            state: match_state,
        })
    })
    .await
}

pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    Path(office_id): Path<OfficeId>,
    Json(request): Json<CreateTournamentRequest>,
) -> impl IntoResponse {
    run_blocking(state, write_status, move |state| {
        let tournament = state.ladder.create_tournament(
            request.creator_id,
            office_id,
            &request.name,
            &request.participants,
            &mut rand::rng(),
        )?;
        let view = state.processor.tournament(tournament.id)?;
        Ok(TournamentResponse::from(view))
    })
    .await
}
