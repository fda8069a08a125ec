use serde::Deserialize;

pub mod assessment;
pub mod catalog;
pub mod form;
pub mod learner;

/// Success or error message carried over a redirect.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct Banner {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Which rows a bulk form applies its action to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

impl BulkAction {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim() {
            "activate" => Ok(BulkAction::Activate),
            "deactivate" => Ok(BulkAction::Deactivate),
            "delete" => Ok(BulkAction::Delete),
            "" => Err("Choose a bulk action.".to_string()),
            other => Err(format!("Unknown bulk action '{}'.", other)),
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            BulkAction::Activate => "activated",
            BulkAction::Deactivate => "deactivated",
            BulkAction::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub ids: Vec<i64>,
}

impl BulkRequest {
    pub fn from_fields(fields: &form::FormFields) -> Result<Self, String> {
        let action = BulkAction::parse(fields.get("action").unwrap_or_default())?;
        let ids = fields.ids("id")?;
        if ids.is_empty() {
            return Err("Select at least one row.".to_string());
        }
        Ok(BulkRequest { action, ids })
    }
}

#[cfg(test)]
mod tests {
    use super::form::FormFields;
    use super::*;

    #[test]
    fn bulk_request_requires_action_and_rows() {
        let empty = FormFields::new(vec![("action".into(), "delete".into())]);
        assert!(BulkRequest::from_fields(&empty).is_err());

        let no_action = FormFields::new(vec![("id".into(), "1".into())]);
        assert!(BulkRequest::from_fields(&no_action).is_err());

        let ok = FormFields::new(vec![
            ("action".into(), "deactivate".into()),
            ("id".into(), "7".into()),
            ("id".into(), "9".into()),
        ]);
        assert_eq!(
            BulkRequest::from_fields(&ok),
            Ok(BulkRequest {
                action: BulkAction::Deactivate,
                ids: vec![7, 9],
            })
        );
    }
}
