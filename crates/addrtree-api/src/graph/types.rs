// Graph response shapes for the users collection.

use serde::Deserialize;

/// One page of an OData collection.
///
/// `next_link` is absolute and already carries every query option of the
/// original request, so it is followed verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// A user as projected by `$select=id,displayName,department,mail,jobTitle`.
///
/// Graph omits or nulls any property the tenant has not populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<String>,
    pub department: Option<String>,
    pub mail: Option<String>,
    pub job_title: Option<String>,
}

/// A user as projected by `$select=department`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DepartmentRecord {
    pub department: Option<String>,
}

/// Graph error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
