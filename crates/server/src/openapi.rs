use chrono::NaiveDate;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct TaskRequestDoc {
    pub title: String,
    pub description: Option<String>,
    /// ALCOHOL | TOBACCO
    pub license_type: Option<String>,
    /// NEW | RENEWAL
    pub action_type: Option<String>,
    pub store_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub deadline_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub status_reason: Option<String>,
    pub subtask_type: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StoreRequestDoc {
    pub mvz: Option<String>,
    pub name: String,
    pub address: String,
    pub inn: String,
    pub kpp: Option<String>,
    pub cfo: Option<String>,
    pub oktmo: Option<String>,
    pub has_restriction: bool,
    pub alcohol_license_expiry: Option<NaiveDate>,
    pub tobacco_license_expiry: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegionRequestDoc {
    pub license_type: Option<String>,
    pub name: Option<String>,
    pub region_code: Option<String>,
    pub region_giid: Option<String>,
    pub counterparty_code: Option<String>,
    pub counterparty_inn: Option<String>,
    pub kpp: Option<String>,
    pub settlement_bik: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PaymentRequestDoc {
    pub task_id: Option<i64>,
    pub amount: f64,
    /// STATE_FEE | FINE | OTHER
    #[schema(rename = "type")]
    pub payment_type: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub bank_mark_required: bool,
    pub store_ids: Vec<i64>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EgrnRequestDoc {
    pub applicant_type: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cadastral_number: String,
    pub object_type: Option<String>,
    pub mvz: Option<String>,
}

#[derive(ToSchema)]
pub struct EmailRequestDoc { pub to: String, pub subject: String, pub text: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::users::list,
        crate::routes::users::workload,
        crate::routes::tasks::list,
        crate::routes::tasks::create,
        crate::routes::tasks::get,
        crate::routes::tasks::update,
        crate::routes::tasks::delete,
        crate::routes::tasks::update_status,
        crate::routes::tasks::upcoming,
        crate::routes::tasks::stats,
        crate::routes::tasks::overdue,
        crate::routes::tasks::unassigned,
        crate::routes::tasks::trend,
        crate::routes::tasks::subtasks,
        crate::routes::tasks::create_subtask,
        crate::routes::tasks::planned_dates,
        crate::routes::documents::upload,
        crate::routes::documents::list,
        crate::routes::documents::delete,
        crate::routes::documents::download,
        crate::routes::stores::list,
        crate::routes::stores::license_stats,
        crate::routes::stores::get,
        crate::routes::stores::create,
        crate::routes::stores::update,
        crate::routes::stores::delete,
        crate::routes::regions::list,
        crate::routes::regions::get,
        crate::routes::regions::create,
        crate::routes::regions::update,
        crate::routes::regions::delete,
        crate::routes::regions::search,
        crate::routes::regions::by_license_type,
        crate::routes::payments::list,
        crate::routes::payments::create,
        crate::routes::payments::get,
        crate::routes::payments::by_task,
        crate::routes::payments::update_status,
        crate::routes::egrn::list,
        crate::routes::egrn::create,
        crate::routes::egrn::get,
        crate::routes::email::send,
        crate::routes::email::send_multipart,
        crate::routes::admin::run_renewal,
        crate::routes::geo::geocode,
        crate::routes::geo::nearby,
        crate::routes::dev::list_stores,
        crate::routes::dev::get_store,
        crate::routes::dev::create_store,
        crate::routes::dev::update_store,
        crate::routes::dev::delete_store,
        crate::routes::dev::list_projects,
        crate::routes::dev::get_project,
        crate::routes::dev::create_project,
        crate::routes::dev::update_project,
        crate::routes::dev::update_project_status,
        crate::routes::dev::delete_project,
        crate::routes::dev::project_gantt,
        crate::routes::dev::list_tasks,
        crate::routes::dev::list_project_tasks,
        crate::routes::dev::get_task,
        crate::routes::dev::create_task,
        crate::routes::dev::update_task,
        crate::routes::dev::update_task_status,
        crate::routes::dev::upload_document,
        crate::routes::dev::list_documents,
        crate::routes::dev::download_document,
        crate::routes::dev::delete_document,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TaskRequestDoc,
            StoreRequestDoc,
            RegionRequestDoc,
            PaymentRequestDoc,
            EgrnRequestDoc,
            EmailRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "tasks"),
        (name = "documents"),
        (name = "stores"),
        (name = "regions"),
        (name = "payments"),
        (name = "egrn"),
        (name = "email"),
        (name = "admin"),
        (name = "geo"),
        (name = "dev")
    )
)]
pub struct ApiDoc;
