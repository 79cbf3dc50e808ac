use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use agenda_core::models::{
    backend::{
        AssignmentRecord, ConstraintRecord, CreateAssignmentRequest, GroupRecord, PersonRecord,
        SessionRecord, TimeSlotRecord, UpdateAssignmentRequest,
    },
    ids::{GroupRef, PersonRef, RemoteAssignmentId, SessionId},
};

use crate::{config::SourceConfig, source::AgendaSource};

/// [`AgendaSource`] backed by the scheduling backend's JSON API.
pub struct HttpAgendaSource {
    client: Client,
    config: SourceConfig,
}

impl HttpAgendaSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .wrap_err("Failed to build backend HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("GET {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("GET {url} returned an error status"))?;

        response
            .json::<T>()
            .await
            .wrap_err_with(|| format!("GET {url} returned an unreadable body"))
    }
}

#[async_trait]
impl AgendaSource for HttpAgendaSource {
    async fn fetch_timeslots(&self) -> Result<Vec<TimeSlotRecord>> {
        self.get_json(self.config.meeting_url("timeslots")).await
    }

    async fn fetch_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.get_json(self.config.meeting_url("sessions")).await
    }

    async fn fetch_assignments(&self) -> Result<Vec<AssignmentRecord>> {
        self.get_json(self.config.meeting_url("assignments")).await
    }

    async fn fetch_constraints(&self, session: SessionId) -> Result<Vec<ConstraintRecord>> {
        self.get_json(
            self.config
                .meeting_url(&format!("session/{}/constraints", session.0)),
        )
        .await
    }

    async fn fetch_group(&self, href: GroupRef) -> Result<GroupRecord> {
        self.get_json(self.config.resolve(href.as_str())).await
    }

    async fn fetch_person(&self, href: PersonRef) -> Result<PersonRecord> {
        self.get_json(self.config.resolve(href.as_str())).await
    }

    async fn create_assignment(&self, request: CreateAssignmentRequest) -> Result<AssignmentRecord> {
        let url = self.config.meeting_url("assignments");
        debug!(
            "POST {} session={} timeslot={}",
            url, request.session_id, request.timeslot_id
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .wrap_err_with(|| format!("POST {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("POST {url} returned an error status"))?;

        response
            .json::<AssignmentRecord>()
            .await
            .wrap_err("Backend returned an unreadable assignment")
    }

    async fn delete_assignment(&self, id: RemoteAssignmentId) -> Result<()> {
        let url = self.config.meeting_url(&format!("assignment/{}", id.0));
        debug!("DELETE {}", url);

        self.client
            .delete(&url)
            .send()
            .await
            .wrap_err_with(|| format!("DELETE {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("DELETE {url} returned an error status"))?;

        Ok(())
    }

    async fn set_pinned(&self, id: RemoteAssignmentId, pinned: bool) -> Result<()> {
        let url = self.config.meeting_url(&format!("assignment/{}", id.0));
        debug!("PUT {} pinned={}", url, pinned);

        self.client
            .put(&url)
            .json(&UpdateAssignmentRequest { pinned })
            .send()
            .await
            .wrap_err_with(|| format!("PUT {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("PUT {url} returned an error status"))?;

        Ok(())
    }
}
