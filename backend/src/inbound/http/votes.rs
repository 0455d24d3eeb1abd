//! Vote API handlers.
//!
//! ```text
//! POST /api/v1/questions/42/vote/up
//! POST /api/v1/questions/42/tags/5/vote/down
//! GET /api/v1/questions/42/votes
//! GET /api/v1/questions/42/tags/5/votes
//! ```
//!
//! Casting toggles: a second cast by the same caller withdraws the first
//! whatever direction it names.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::VoteLedger;
use crate::domain::{
    Error, ErrorCode, QuestionId, TagId, UserId, VoteDirection, VoteDirectionError, VoteOutcome,
    VoteState, VoteTarget,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::{OptionalIdentity, RequiredIdentity};
use crate::inbound::http::state::HttpState;

/// Response body for a cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub target: VoteTarget,
    pub score: i64,
    pub voted: VoteState,
}

impl From<VoteOutcome> for CastVoteResponse {
    fn from(value: VoteOutcome) -> Self {
        Self {
            target: value.target,
            score: value.score,
            voted: value.state,
        }
    }
}

/// Score and caller position used when rendering a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummaryResponse {
    pub score: i64,
    pub voted: VoteState,
}

fn parse_direction(raw: &str) -> ApiResult<VoteDirection> {
    raw.parse().map_err(|err: VoteDirectionError| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "direction", "code": "invalid_direction" }))
    })
}

/// Cast once more when the first attempt lost a race with a concurrent
/// toggle by the same voter.
async fn cast_with_retry(
    ledger: &dyn VoteLedger,
    voter: UserId,
    target: VoteTarget,
    direction: VoteDirection,
) -> ApiResult<VoteOutcome> {
    match ledger.cast_vote(voter, target, direction).await {
        Err(err) if err.code() == ErrorCode::Conflict => {
            debug!(%voter, %target, "vote cast conflicted; retrying");
            ledger.cast_vote(voter, target, direction).await
        }
        other => other,
    }
}

async fn cast(
    state: &HttpState,
    identity: RequiredIdentity,
    target: VoteTarget,
    direction: &str,
) -> ApiResult<web::Json<CastVoteResponse>> {
    let direction = parse_direction(direction)?;
    let outcome = cast_with_retry(state.votes.as_ref(), identity.0.id(), target, direction).await?;
    Ok(web::Json(outcome.into()))
}

async fn summarise(
    state: &HttpState,
    identity: OptionalIdentity,
    target: VoteTarget,
) -> ApiResult<web::Json<VoteSummaryResponse>> {
    let score = state.votes.aggregate_score(target).await?;
    let voted = match identity.0 {
        Some(caller) => state.votes.current_vote(caller.id(), target).await?,
        None => VoteState::Neutral,
    };
    Ok(web::Json(VoteSummaryResponse { score, voted }))
}

/// Toggle the caller's vote on a question.
#[post("/questions/{question_id}/vote/{direction}")]
pub async fn vote_question(
    state: web::Data<HttpState>,
    identity: RequiredIdentity,
    path: web::Path<(i64, String)>,
) -> ApiResult<web::Json<CastVoteResponse>> {
    let (question_id, direction) = path.into_inner();
    let target = VoteTarget::question(QuestionId::new(question_id));
    cast(&state, identity, target, &direction).await
}

/// Toggle the caller's vote on a tag as applied to a question.
#[post("/questions/{question_id}/tags/{tag_id}/vote/{direction}")]
pub async fn vote_question_tag(
    state: web::Data<HttpState>,
    identity: RequiredIdentity,
    path: web::Path<(i64, i64, String)>,
) -> ApiResult<web::Json<CastVoteResponse>> {
    let (question_id, tag_id, direction) = path.into_inner();
    let target = VoteTarget::question_tag(QuestionId::new(question_id), TagId::new(tag_id));
    cast(&state, identity, target, &direction).await
}

/// Score of a question and, for signed-in callers, their current vote.
#[get("/questions/{question_id}/votes")]
pub async fn question_votes(
    state: web::Data<HttpState>,
    identity: OptionalIdentity,
    path: web::Path<i64>,
) -> ApiResult<web::Json<VoteSummaryResponse>> {
    let target = VoteTarget::question(QuestionId::new(path.into_inner()));
    summarise(&state, identity, target).await
}

#[get("/questions/{question_id}/tags/{tag_id}/votes")]
pub async fn question_tag_votes(
    state: web::Data<HttpState>,
    identity: OptionalIdentity,
    path: web::Path<(i64, i64)>,
) -> ApiResult<web::Json<VoteSummaryResponse>> {
    let (question_id, tag_id) = path.into_inner();
    let target = VoteTarget::question_tag(QuestionId::new(question_id), TagId::new(tag_id));
    summarise(&state, identity, target).await
}
