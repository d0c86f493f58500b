//! Expense categories.
//!
//! A two-level tree: groups (`parent_id` empty) and their children. The
//! reserved fee category is flagged `is_system` and hidden from pickers and
//! statistics.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Name of the reserved category that receives fee splits.
pub const FEE_CATEGORY_NAME: &str = "M-Pesa Fees";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub is_system: bool,
}

/// A group with its children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// A flattened picker entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    /// 0 for groups, 1 for their children.
    pub depth: u8,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub is_system: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Parent,
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            parent_id: model.parent_id,
            name: model.name,
            is_system: model.is_system,
        }
    }
}

/// Groups `categories` into a tree, keeping the input order.
///
/// Children whose parent is missing are promoted to the top level.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (roots, children): (Vec<_>, Vec<_>) =
        categories.into_iter().partition(|c| c.parent_id.is_none());
    let mut nodes: Vec<CategoryNode> = roots
        .into_iter()
        .map(|category| CategoryNode {
            category,
            children: Vec::new(),
        })
        .collect();
    for child in children {
        match nodes
            .iter_mut()
            .find(|node| Some(node.category.id) == child.parent_id)
        {
            Some(node) => node.children.push(child),
            None => nodes.push(CategoryNode {
                category: child,
                children: Vec::new(),
            }),
        }
    }
    nodes
}

/// Flattens a tree into picker options, dropping system categories.
pub fn options(tree: &[CategoryNode]) -> Vec<CategoryOption> {
    let mut out = Vec::new();
    for node in tree.iter().filter(|n| !n.category.is_system) {
        out.push(CategoryOption {
            id: node.category.id,
            name: node.category.name.clone(),
            parent_id: node.category.parent_id,
            depth: 0,
        });
        out.extend(
            node.children
                .iter()
                .filter(|c| !c.is_system)
                .map(|c| CategoryOption {
                    id: c.id,
                    name: c.name.clone(),
                    parent_id: c.parent_id,
                    depth: 1,
                }),
        );
    }
    out
}
