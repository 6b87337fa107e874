//! Viewer extraction from, and state persistence to, the user session.
//!
//! Signing in is handled elsewhere: this module only reads the member ID an
//! auth layer stored and writes back the values discovery asks to keep.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{
    domain::models::{MemberId, SessionUpdates, Viewer},
    routes::ApiError,
};

pub const MEMBER_ID_KEY: &str = "memberId";
pub const LAST_SELECTED_CHANNEL_KEY: &str = "lastSelectedChannel";
pub const HIGHLIGHT_TERMS_KEY: &str = "highlightTerms";

/// The request's [`Viewer`] together with its session.
///
/// Never rejects a missing member: anyone without `memberId` in their
/// session is a guest.
#[derive(Debug, Clone)]
pub struct CurrentViewer {
    pub viewer: Viewer,
    session: Session,
}

impl CurrentViewer {
    /// Write every value that is set; leave the rest of the session alone.
    pub async fn persist(&self, updates: &SessionUpdates) -> Result<(), ApiError> {
        if let Some(channel) = updates.last_selected_channel {
            self.session
                .insert(LAST_SELECTED_CHANNEL_KEY, channel)
                .await?;
        }
        if let Some(terms) = &updates.highlight_terms {
            self.session.insert(HIGHLIGHT_TERMS_KEY, terms).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentViewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, message)| ApiError::new(status, message))?;

        let viewer = match session.get::<MemberId>(MEMBER_ID_KEY).await? {
            Some(member_id) => Viewer::member(member_id),
            None => Viewer::guest(),
        };

        Ok(CurrentViewer { viewer, session })
    }
}
