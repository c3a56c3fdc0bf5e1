//! JSON shapes exchanged with the collections API.
use curator_core::{
    Collection, CollectionId, Company, CompanyId, JobId, JobStatus, Page, TransferJob,
    TransferRequest, TransferSelection,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionMetadataDto {
    pub id: String,
    pub collection_name: String,
    #[serde(default)]
    pub total: u64,
}

impl From<CollectionMetadataDto> for Collection {
    fn from(dto: CollectionMetadataDto) -> Self {
        Collection {
            id: CollectionId::new(dto.id),
            name: dto.collection_name,
            total: dto.total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyDto {
    pub id: CompanyId,
    pub company_name: String,
    #[serde(default)]
    pub liked: bool,
}

impl From<CompanyDto> for Company {
    fn from(dto: CompanyDto) -> Self {
        Company {
            id: dto.id,
            name: dto.company_name,
            liked: dto.liked,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionPageDto {
    pub id: String,
    pub collection_name: String,
    #[serde(default)]
    pub companies: Vec<CompanyDto>,
    pub total: u64,
}

impl CollectionPageDto {
    pub fn into_page(self, offset: u64) -> Page {
        Page {
            collection_id: CollectionId::new(self.id),
            collection_name: self.collection_name,
            offset,
            companies: self.companies.into_iter().map(Company::from).collect(),
            total: self.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCollectionBody<'a> {
    pub collection_name: &'a str,
}

/// Response to both create and delete.
#[derive(Debug, Deserialize)]
pub(crate) struct CollectionChangeDto {
    pub id: String,
    pub collection_name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveCompaniesBody<'a> {
    pub company_ids: &'a [CompanyId],
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemovedCompaniesDto {
    pub collection_id: String,
    pub removed_count: u64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ToggleFavoriteBody<'a> {
    pub favorites_list_id: &'a str,
    pub company_id: CompanyId,
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoriteStateDto {
    pub company_id: CompanyId,
    pub liked: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub(crate) enum SelectionDto<'a> {
    Ids { ids: &'a [CompanyId] },
    All,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransferBody<'a> {
    pub source_list_id: &'a str,
    pub target_list_id: &'a str,
    pub selection: SelectionDto<'a>,
}

impl<'a> From<&'a TransferRequest> for TransferBody<'a> {
    fn from(request: &'a TransferRequest) -> Self {
        let selection = match &request.selection {
            TransferSelection::All => SelectionDto::All,
            TransferSelection::Ids(ids) => SelectionDto::Ids { ids },
        };
        TransferBody {
            source_list_id: request.source.as_str(),
            target_list_id: request.target.as_str(),
            selection,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransferStartedDto {
    pub job_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum JobStatusDto {
    Queued,
    Running,
    Completed,
    Failed,
}

impl From<JobStatusDto> for JobStatus {
    fn from(dto: JobStatusDto) -> Self {
        match dto {
            JobStatusDto::Queued => JobStatus::Queued,
            JobStatusDto::Running => JobStatus::Running,
            JobStatusDto::Completed => JobStatus::Completed,
            JobStatusDto::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransferJobDto {
    pub job_id: String,
    pub status: JobStatusDto,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub processed_count: u64,
    #[serde(default)]
    pub inserted_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<TransferJobDto> for TransferJob {
    fn from(dto: TransferJobDto) -> Self {
        TransferJob {
            job_id: JobId::new(dto.job_id),
            status: dto.status.into(),
            total_count: dto.total_count,
            processed_count: dto.processed_count,
            inserted_count: dto.inserted_count,
            skipped_count: dto.skipped_count,
            failed_count: dto.failed_count,
            error: dto.error,
        }
    }
}
