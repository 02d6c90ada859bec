//! Turning human-friendly references into canonical IDs.
//!
//! A reference that already looks like an ID is returned as-is without any
//! remote call. Anything else is treated as a display name: the candidate
//! collection is listed and matched exactly. One match resolves, none is
//! `NotFound`, several are `Ambiguous` with every candidate listed.

use crate::errors::{ApiError, Candidate, ResourceKind, ResourceRefs, TeamsError, TeamsResult};
use crate::services::{ChannelsServiceTrait, TeamsServiceTrait};
use crate::types::ChannelMember;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const CHANNEL_THREAD_MARKER: &str = "@thread";
const CHANNEL_ID_PREFIX: &str = "19:";

/// Whether `reference` has the 8-4-4-4-12 hex GUID shape
pub fn is_guid(reference: &str) -> bool {
    reference.len() == 36
        && reference.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// Whether `reference` looks like a channel thread ID
pub fn is_channel_id(reference: &str) -> bool {
    reference.contains(CHANNEL_THREAD_MARKER) || reference.starts_with(CHANNEL_ID_PREFIX)
}

fn matches_member(member: &ChannelMember, reference: &str) -> bool {
    let exact = [member.user_id.as_deref(), member.display_name.as_deref()];
    let folded = [
        member.email.as_deref(),
        member.attribute("userPrincipalName"),
        member.attribute("mail"),
    ];

    exact.into_iter().flatten().any(|value| value == reference)
        || folded
            .into_iter()
            .flatten()
            .any(|value| value.eq_ignore_ascii_case(reference))
}

fn not_found(refs: ResourceRefs, message: String) -> TeamsError {
    TeamsError::NotFound {
        refs,
        source: ApiError::new("NotFound", message).with_status(404),
    }
}

/// Pick the single match, or explain why there is none.
fn select(
    kind: ResourceKind,
    reference: &str,
    matches: Vec<Candidate>,
    refs: ResourceRefs,
    scope: &str,
) -> TeamsResult<String> {
    match matches.as_slice() {
        [] => Err(not_found(
            refs,
            format!("No {kind} named {reference:?} in {scope}"),
        )),
        [only] => Ok(only.id.clone()),
        _ => Err(TeamsError::Ambiguous {
            kind,
            reference: reference.to_string(),
            candidates: matches,
        }),
    }
}

/// Resolves team, channel and member references
#[derive(Clone)]
pub struct ReferenceResolver {
    teams: Arc<dyn TeamsServiceTrait>,
    channels: Arc<dyn ChannelsServiceTrait>,
}

impl ReferenceResolver {
    /// Create a resolver over the given services
    pub fn new(teams: Arc<dyn TeamsServiceTrait>, channels: Arc<dyn ChannelsServiceTrait>) -> Self {
        Self { teams, channels }
    }

    /// Resolve a team name or ID to a team ID
    #[instrument(skip(self, cancel))]
    pub async fn resolve_team(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<String> {
        if is_guid(reference) {
            return Ok(reference.to_string());
        }

        let teams = self.teams.list_joined(cancel).await?;
        let matches: Vec<Candidate> = teams
            .into_iter()
            .filter(|team| team.display_name == reference)
            .map(|team| Candidate::new(team.display_name, team.id))
            .collect();
        debug!(matches = matches.len(), "Matched team by display name");

        select(
            ResourceKind::Team,
            reference,
            matches,
            ResourceRefs::new().with(ResourceKind::Team, [reference]),
            "joined teams",
        )
    }

    /// Resolve a channel name or ID within a team to a channel ID
    #[instrument(skip(self, cancel))]
    pub async fn resolve_channel(
        &self,
        team_id: &str,
        reference: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<String> {
        if is_channel_id(reference) {
            return Ok(reference.to_string());
        }

        let channels = self.channels.list(team_id, cancel).await?;
        let matches: Vec<Candidate> = channels
            .into_iter()
            .filter(|channel| channel.display_name == reference)
            .map(|channel| Candidate::new(channel.display_name, channel.id))
            .collect();
        debug!(matches = matches.len(), "Matched channel by display name");

        select(
            ResourceKind::Channel,
            reference,
            matches,
            ResourceRefs::new()
                .with(ResourceKind::Team, [team_id])
                .with(ResourceKind::Channel, [reference]),
            &format!("team {team_id}"),
        )
    }

    /// Resolve a user reference to the membership ID within a channel.
    ///
    /// User ID and display name match exactly; email, principal name and
    /// mail attributes match case-insensitively.
    #[instrument(skip(self, cancel))]
    pub async fn resolve_member(
        &self,
        team_id: &str,
        channel_id: &str,
        user_reference: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<String> {
        let members = self
            .channels
            .list_members(team_id, channel_id, cancel)
            .await?;
        let matches: Vec<Candidate> = members
            .into_iter()
            .filter(|member| matches_member(member, user_reference))
            .map(|member| Candidate::new(member.display_name.unwrap_or_default(), member.id))
            .collect();
        debug!(matches = matches.len(), "Matched channel member");

        select(
            ResourceKind::User,
            user_reference,
            matches,
            ResourceRefs::new()
                .with(ResourceKind::Team, [team_id])
                .with(ResourceKind::Channel, [channel_id])
                .with(ResourceKind::User, [user_reference]),
            &format!("channel {channel_id}"),
        )
    }
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver").finish_non_exhaustive()
    }
}
