use mealtable_app::RecommendationRequest;
use mealtable_core::domain::member::{MemberId, RecommendationType};
use serde_json::json;

use crate::commands::{bootstrap, CommandResult, RuntimeOptions};

/// Switches a member's persona. The change lives as long as the seeded repositories do,
/// so the payload also carries the member's first page under the new persona.
pub fn run(options: &RuntimeOptions, member_id: i64, raw_type: &str) -> CommandResult {
    let recommendation_type = match raw_type.parse::<RecommendationType>() {
        Ok(recommendation_type) => recommendation_type,
        Err(error) => return CommandResult::from_application_error("set-type", error.into()),
    };

    let runtime = match bootstrap("set-type", options) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let member_id = MemberId(member_id);
    let mut request = RecommendationRequest::with_defaults(&runtime.config.recommendation);
    request.at = options.at;

    let outcome = runtime.block_on(async {
        let member =
            runtime.service.update_recommendation_type(member_id, recommendation_type).await?;
        let page = runtime.service.get_recommendations(member_id, &request).await?;
        Ok::<_, mealtable_core::errors::ApplicationError>((member, page))
    });

    match outcome {
        Ok((member, page)) => CommandResult::success(
            "set-type",
            format!("member {member_id} now uses {recommendation_type}"),
            Some(json!({ "member": member, "recommendations": page })),
        ),
        Err(error) => CommandResult::from_application_error("set-type", error),
    }
}
