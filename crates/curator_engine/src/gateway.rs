use curator_core::{
    Collection, CollectionId, CompanyId, JobId, Page, TransferJob, TransferRequest,
};
use curator_logging::{curator_debug, curator_trace};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::map_reqwest_error;
use crate::wire::{
    CollectionChangeDto, CollectionMetadataDto, CollectionPageDto, CreateCollectionBody,
    FavoriteStateDto, RemoveCompaniesBody, RemovedCompaniesDto, ToggleFavoriteBody, TransferBody,
    TransferJobDto, TransferStartedDto,
};
use crate::{GatewayError, GatewaySettings};

/// Server acknowledgement of a created or deleted collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    pub id: CollectionId,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedCompanies {
    pub collection_id: CollectionId,
    pub removed_count: u64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteState {
    pub company_id: CompanyId,
    pub liked: bool,
}

/// Typed access to the collections API.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<Collection>, GatewayError>;

    async fn get_page(
        &self,
        collection_id: &CollectionId,
        offset: u64,
        limit: u64,
    ) -> Result<Page, GatewayError>;

    async fn create_collection(&self, name: &str) -> Result<CollectionChange, GatewayError>;

    async fn delete_collection(
        &self,
        collection_id: &CollectionId,
    ) -> Result<CollectionChange, GatewayError>;

    async fn remove_companies(
        &self,
        collection_id: &CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<RemovedCompanies, GatewayError>;

    async fn toggle_favorite(
        &self,
        favorites_list_id: &CollectionId,
        company_id: CompanyId,
        liked: bool,
    ) -> Result<FavoriteState, GatewayError>;

    async fn start_transfer(&self, request: &TransferRequest) -> Result<JobId, GatewayError>;

    async fn job_status(&self, job_id: &JobId) -> Result<TransferJob, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| GatewayError::InvalidUrl(format!("{}: {}", settings.base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(format!(
                "{} cannot be used as an API base",
                settings.base_url
            )));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::Network(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, GatewayError> {
        curator_trace!("{} {}", method, url);
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            curator_debug!("{} {} -> {}", method, url, status);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|err| GatewayError::Decode(err.to_string()))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, GatewayError> {
        let bytes = serde_json::to_vec(body).map_err(|err| GatewayError::Decode(err.to_string()))?;
        self.send(method, url, Some(bytes)).await
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn list_collections(&self) -> Result<Vec<Collection>, GatewayError> {
        let url = self.endpoint(&["collections"])?;
        let dtos: Vec<CollectionMetadataDto> = self.send(Method::GET, url, None).await?;
        Ok(dtos.into_iter().map(Collection::from).collect())
    }

    async fn get_page(
        &self,
        collection_id: &CollectionId,
        offset: u64,
        limit: u64,
    ) -> Result<Page, GatewayError> {
        let mut url = self.endpoint(&["collections", collection_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        let dto: CollectionPageDto = self.send(Method::GET, url, None).await?;
        Ok(dto.into_page(offset))
    }

    async fn create_collection(&self, name: &str) -> Result<CollectionChange, GatewayError> {
        let url = self.endpoint(&["collections"])?;
        let dto: CollectionChangeDto = self
            .send_json(Method::POST, url, &CreateCollectionBody { collection_name: name })
            .await?;
        Ok(dto.into())
    }

    async fn delete_collection(
        &self,
        collection_id: &CollectionId,
    ) -> Result<CollectionChange, GatewayError> {
        let url = self.endpoint(&["collections", collection_id.as_str()])?;
        let dto: CollectionChangeDto = self.send(Method::DELETE, url, None).await?;
        Ok(dto.into())
    }

    async fn remove_companies(
        &self,
        collection_id: &CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<RemovedCompanies, GatewayError> {
        let url = self.endpoint(&["collections", collection_id.as_str(), "companies"])?;
        let dto: RemovedCompaniesDto = self
            .send_json(Method::DELETE, url, &RemoveCompaniesBody { company_ids })
            .await?;
        Ok(RemovedCompanies {
            collection_id: CollectionId::new(dto.collection_id),
            removed_count: dto.removed_count,
            message: dto.message,
        })
    }

    async fn toggle_favorite(
        &self,
        favorites_list_id: &CollectionId,
        company_id: CompanyId,
        liked: bool,
    ) -> Result<FavoriteState, GatewayError> {
        let url = self.endpoint(&["favorites", "toggle"])?;
        let body = ToggleFavoriteBody {
            favorites_list_id: favorites_list_id.as_str(),
            company_id,
            liked,
        };
        let dto: FavoriteStateDto = self.send_json(Method::POST, url, &body).await?;
        Ok(FavoriteState {
            company_id: dto.company_id,
            liked: dto.liked,
        })
    }

    async fn start_transfer(&self, request: &TransferRequest) -> Result<JobId, GatewayError> {
        let url = self.endpoint(&["transfer"])?;
        let dto: TransferStartedDto = self
            .send_json(Method::POST, url, &TransferBody::from(request))
            .await?;
        Ok(JobId::new(dto.job_id))
    }

    async fn job_status(&self, job_id: &JobId) -> Result<TransferJob, GatewayError> {
        let url = self.endpoint(&["transfer", "jobs", job_id.as_str()])?;
        let dto: TransferJobDto = self.send(Method::GET, url, None).await?;
        Ok(dto.into())
    }
}

impl From<CollectionChangeDto> for CollectionChange {
    fn from(dto: CollectionChangeDto) -> Self {
        CollectionChange {
            id: CollectionId::new(dto.id),
            name: dto.collection_name,
            message: dto.message,
        }
    }
}
