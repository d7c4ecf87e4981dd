use crate::config::ClockifyConfig;
use crate::error::{ClockifyError, Result};
use crate::models::{DetailedReport, Project, UserAccount, Workspace};
use crate::pacing::RequestPacer;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug)]
pub struct ClockifyClient {
    http: HttpClient,
    config: ClockifyConfig,
    pacer: RequestPacer,
}

impl ClockifyClient {
    pub fn new(config: ClockifyConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let pacer = RequestPacer::new(config.cooldown);
        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    pub fn new_with_pacer(config: ClockifyConfig, pacer: RequestPacer) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    pub fn config(&self) -> &ClockifyConfig {
        &self.config
    }

    pub async fn get<T>(&self, url: String) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.pacer.await_turn().await;
        tracing::debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        Self::parse_json(response).await
    }

    pub async fn post<B, T>(&self, url: String, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.pacer.await_turn().await;
        tracing::debug!("POST {url}");
        let response = self.http.post(url).json(body).send().await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(ClockifyError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(ClockifyError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClockifyError::http(status, body))
        }
    }

    pub async fn get_current_user(&self) -> Result<UserAccount> {
        self.get(self.config.api_url("user")).await
    }

    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
        self.get(self.config.api_url("workspaces")).await
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let path = format!("workspaces/{}/projects", self.config.workspace_id);
        self.get(self.config.api_url(&path)).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let path = format!(
            "workspaces/{}/projects/{}",
            self.config.workspace_id, project_id
        );
        self.get(self.config.api_url(&path)).await
    }

    /// Requests one page of the detailed time-entry report for the
    /// configured user. Pages are 1-based.
    pub async fn fetch_report_page(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: u32,
    ) -> Result<DetailedReport> {
        let path = format!("workspaces/{}/reports/detailed", self.config.workspace_id);
        let body = DetailedReportRequest {
            date_range_start: start.to_rfc3339_opts(SecondsFormat::Secs, true),
            date_range_end: end.to_rfc3339_opts(SecondsFormat::Secs, true),
            export_type: "JSON",
            users: ReportUserFilter {
                ids: [self.config.user_id.as_str()],
            },
            detailed_filter: DetailedFilter {
                page,
                page_size: self.config.page_size,
            },
        };
        self.post(self.config.reports_url(&path), &body).await
    }
}

fn build_http_client(config: &ClockifyConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(API_KEY_HEADER),
        header_value(config.api_key.clone())?,
    );
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| ClockifyError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| ClockifyError::Other(err.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedReportRequest<'a> {
    date_range_start: String,
    date_range_end: String,
    export_type: &'static str,
    users: ReportUserFilter<'a>,
    detailed_filter: DetailedFilter,
}

#[derive(Debug, Serialize)]
struct ReportUserFilter<'a> {
    ids: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedFilter {
    page: u32,
    page_size: u32,
}
