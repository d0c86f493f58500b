//! Category API endpoints

use api_types::category::{CategoryNode, CategoryOption, CategoryStat, CategoryView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        parent_id: category.parent_id,
        name: category.name,
        is_system: category.is_system,
    }
}

pub async fn tree(State(state): State<ServerState>) -> Result<Json<Vec<CategoryNode>>, ServerError> {
    let nodes = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(|node| CategoryNode {
            category: view(node.category),
            children: node.children.into_iter().map(view).collect(),
        })
        .collect();
    Ok(Json(nodes))
}

pub async fn dropdown(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryOption>>, ServerError> {
    let options = state
        .engine
        .category_options()
        .await?
        .into_iter()
        .map(|o| CategoryOption {
            id: o.id,
            name: o.name,
            parent_id: o.parent_id,
            depth: o.depth,
        })
        .collect();
    Ok(Json(options))
}

pub async fn stats(State(state): State<ServerState>) -> Result<Json<Vec<CategoryStat>>, ServerError> {
    let stats = state
        .engine
        .category_stats()
        .await?
        .into_iter()
        .map(|s| CategoryStat {
            category_id: s.category_id,
            name: s.name,
            parent_id: s.parent_id,
            total_minor: s.total.minor(),
            split_count: s.split_count,
        })
        .collect();
    Ok(Json(stats))
}
