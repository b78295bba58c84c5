use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::RoomClient;
use livekit_api::services::{ServiceError, TwirpError, TwirpErrorCode};
use std::time::Duration;

/// LiveKit token issuance and room management.
#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
    room_client: RoomClient,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client =
            RoomClient::with_api_key(&config.url, &config.api_key, &config.api_secret);
        Self {
            config,
            room_client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Returns the browser-facing URL. Falls back to the internal URL if no
    /// public URL is configured.
    pub fn get_public_url(&self) -> &str {
        if self.config.public_url.is_empty() {
            &self.config.url
        } else {
            &self.config.public_url
        }
    }

    /// Each user gets a stable room of their own.
    pub fn room_for_identity(&self, identity: &str) -> String {
        format!("{}{}", self.config.room_prefix, identity)
    }

    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
        participant_name: &str,
    ) -> Result<String, VoiceError> {
        if room_name.is_empty() || participant_identity.is_empty() {
            return Err(VoiceError::Config(
                "room name and participant identity are required".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    /// Deletes a room, disconnecting every participant in it.
    pub async fn delete_room(&self, room: &str) -> Result<(), VoiceError> {
        self.room_client
            .delete_room(room)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }

    /// Returns the number of participants currently in a room.
    ///
    /// A room LiveKit does not know about counts as empty. Any other failure
    /// is reported as [`VoiceError::RoomService`].
    pub async fn participant_count(&self, room_name: &str) -> Result<u32, VoiceError> {
        match self.room_client.list_participants(room_name).await {
            Ok(participants) => Ok(participants.len() as u32),
            Err(e) if is_room_missing(&e) => Ok(0),
            Err(e) => {
                tracing::warn!(room = %room_name, "failed to list participants: {}", e);
                Err(VoiceError::RoomService(e.to_string()))
            }
        }
    }
}

fn is_room_missing(error: &ServiceError) -> bool {
    matches!(
        error,
        ServiceError::Twirp(TwirpError::Twirp(code)) if code.code == TwirpErrorCode::NOT_FOUND
    )
}
