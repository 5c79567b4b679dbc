//! Answer-to-query validation.
//!
//! Pure check that a provided attribute actually satisfies the structural
//! shape of the query that requested it. Runs before an accept is allowed
//! to proceed; returns a `ValidationResult` so the outcome can be shown to
//! the deciding user instead of crashing the pipeline.

use chrono::{DateTime, Utc};
use wallet_core::{
    Address, ApplicationError, AttributeContent, AttributeQuery, ValidationResult,
};

fn mismatch(code: &str, message: impl Into<String>) -> ValidationResult {
    ValidationResult::error(ApplicationError::new(
        format!("requests.query_answer.{code}"),
        message,
    ))
}

/// Whether the answer window covers the queried window.
fn window_covers(
    answer: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    query_from: Option<DateTime<Utc>>,
    query_to: Option<DateTime<Utc>>,
) -> bool {
    let (answer_from, answer_to) = answer;
    let from_ok = match (answer_from, query_from) {
        (Some(a), Some(q)) => a <= q,
        _ => true,
    };
    let to_ok = match (answer_to, query_to) {
        (Some(a), Some(q)) => a >= q,
        (Some(_), None) => false,
        _ => true,
    };
    from_ok && to_ok
}

/// Validates that `attribute` answers `query`, as decided by `responder`.
///
/// Checks value type, ownership, tags, the validity window, and for
/// relationship queries the key, confidentiality, and title/description of
/// proprietary values.
#[must_use]
pub fn validate_answer_to_query(
    query: &AttributeQuery,
    attribute: &AttributeContent,
    responder: &Address,
) -> ValidationResult {
    if attribute.value_type() != query.value_type() {
        return mismatch(
            "value_type_mismatch",
            format!(
                "The query asks for {} but the answer is {}.",
                query.value_type(),
                attribute.value_type()
            ),
        );
    }

    match (query, attribute) {
        (AttributeQuery::Identity(query), AttributeContent::Identity(identity)) => {
            if &identity.owner != responder {
                return mismatch(
                    "owner_mismatch",
                    "An identity attribute answer must be owned by the responder.",
                );
            }
            if let Some(tag) = query
                .tags
                .iter()
                .find(|tag| !identity.tags.contains(tag))
            {
                return mismatch(
                    "tag_mismatch",
                    format!("The answer does not carry the queried tag '{tag}'."),
                );
            }
            if !window_covers(
                (identity.valid_from, identity.valid_to),
                query.valid_from,
                query.valid_to,
            ) {
                return mismatch(
                    "validity_mismatch",
                    "The answer is not valid over the queried window.",
                );
            }
            ValidationResult::success()
        }

        (AttributeQuery::Relationship(query), AttributeContent::Relationship(relationship)) => {
            if relationship.key != query.key {
                return mismatch(
                    "key_mismatch",
                    format!(
                        "The query asks for key '{}' but the answer carries '{}'.",
                        query.key, relationship.key
                    ),
                );
            }
            if let Some(owner) = &query.owner {
                if &relationship.owner != owner {
                    return mismatch(
                        "owner_mismatch",
                        "The answer is owned by a different identity than queried.",
                    );
                }
            }
            if let Some(confidentiality) = query.confidentiality {
                if relationship.confidentiality != confidentiality {
                    return mismatch(
                        "confidentiality_mismatch",
                        "The answer does not carry the queried confidentiality.",
                    );
                }
            }
            if let Some(title) = &query.title {
                if relationship.value.proprietary_title() != Some(title.as_str()) {
                    return mismatch(
                        "title_mismatch",
                        "The answer's value does not carry the queried title.",
                    );
                }
            }
            if let Some(description) = &query.description {
                if relationship.value.proprietary_description() != Some(description.as_str()) {
                    return mismatch(
                        "description_mismatch",
                        "The answer's value does not carry the queried description.",
                    );
                }
            }
            if !window_covers(
                (relationship.valid_from, relationship.valid_to),
                query.valid_from,
                query.valid_to,
            ) {
                return mismatch(
                    "validity_mismatch",
                    "The answer is not valid over the queried window.",
                );
            }
            ValidationResult::success()
        }

        (
            AttributeQuery::ThirdPartyRelationship(query),
            AttributeContent::Relationship(relationship),
        ) => {
            if relationship.key != query.key {
                return mismatch(
                    "key_mismatch",
                    format!(
                        "The query asks for key '{}' but the answer carries '{}'.",
                        query.key, relationship.key
                    ),
                );
            }
            if !query.third_party.contains(&relationship.owner) {
                return mismatch(
                    "third_party_mismatch",
                    "The answer's owner is not one of the queried third parties.",
                );
            }
            ValidationResult::success()
        }

        // Content kind does not fit the query form.
        _ => mismatch(
            "content_kind_mismatch",
            "The answer's content kind does not fit the query.",
        ),
    }
}
