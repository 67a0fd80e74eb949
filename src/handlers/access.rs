use uuid::Uuid;

use crate::database::{Collection, Document};
use crate::error::AppError;
use crate::schema::catalog::Resource;
use crate::session::{Session, SessionUser};

/// Load a record for edit or update, enforcing ownership.
///
/// Every edit and update path goes through here. A malformed id, a missing
/// record and a record owned by someone else are all `Forbidden`.
pub async fn load_owned(collection: &Collection, user: &SessionUser, id: &str) -> Result<Document, AppError> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::Forbidden)?;

    match collection.get(id).await? {
        Some(doc) if doc.is_owned_by(user.id) => Ok(doc),
        Some(doc) => {
            tracing::warn!(
                "User {} attempted to access {}/{} owned by {:?}",
                user.id,
                collection.schema().collection,
                doc.id,
                doc.owner
            );
            Err(AppError::Forbidden)
        }
        None => Err(AppError::Forbidden),
    }
}

/// The session's current academic year, if `resource` is year-scoped.
pub async fn current_year(resource: &Resource, session: &Session) -> Result<Option<String>, AppError> {
    if !resource.year_scoped {
        return Ok(None);
    }
    session.academic_year().await.map(Some).ok_or(AppError::YearNotSelected)
}
