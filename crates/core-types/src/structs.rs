use crate::document::{Document, DocumentId};
use serde::{Deserialize, Serialize};

/// A customer record, served under `/customer`.
///
/// Missing fields bind to their zero values, so `{"id": "..."}` alone is a
/// valid body for delete requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i64,
}

impl Document for Customer {
    const RESOURCE: &'static str = "customer";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}

/// The Portuguese-named variant of [`Customer`], served under `/cliente`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub idade: i64,
}

impl Document for Cliente {
    const RESOURCE: &'static str = "cliente";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}
