//! Moderation report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Kind of content a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReportTargetKind {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
}

/// Reported content: exactly one post or one comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReportTarget {
    /// A board post.
    Post(String),
    /// A comment on a board post.
    Comment(String),
}

impl ReportTarget {
    /// Storage discriminant of this target.
    #[must_use]
    pub const fn kind(&self) -> ReportTargetKind {
        match self {
            Self::Post(_) => ReportTargetKind::Post,
            Self::Comment(_) => ReportTargetKind::Comment,
        }
    }

    /// Id of the targeted content.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }

    /// Rebuild the target from its stored columns.
    #[must_use]
    pub const fn from_parts(kind: ReportTargetKind, id: String) -> Self {
        match kind {
            ReportTargetKind::Post => Self::Post(id),
            ReportTargetKind::Comment => Self::Comment(id),
        }
    }
}

/// Report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The user who filed the report.
    #[sea_orm(indexed)]
    pub reporter_id: String,
    pub target_kind: ReportTargetKind,
    pub target_id: String,
    /// Author of the target at filing time. Survives deletion of the content.
    #[sea_orm(indexed)]
    pub target_author_id: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    #[sea_orm(nullable)]
    pub screenshot_url: Option<String>,
    #[sea_orm(indexed)]
    pub status: ReportStatus,
    /// Admin who resolved or rejected the report.
    #[sea_orm(nullable)]
    pub resolved_by: Option<String>,
    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// The reported content as a tagged value.
    #[must_use]
    pub fn target(&self) -> ReportTarget {
        ReportTarget::from_parts(self.target_kind, self.target_id.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parts_round_trip() {
        let target = ReportTarget::Comment("c1".to_string());
        assert_eq!(target.kind(), ReportTargetKind::Comment);
        assert_eq!(target.id(), "c1");
        assert_eq!(
            ReportTarget::from_parts(ReportTargetKind::Post, "p1".to_string()),
            ReportTarget::Post("p1".to_string())
        );
    }

    #[test]
    fn test_target_serializes_tagged() {
        let json = serde_json::to_value(ReportTarget::Post("p9".to_string())).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "kind": "post", "id": "p9" }));
    }
}
