//! Department queries and tree assembly.

use chrono::Utc;
use palisade_common::Page;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::models::Department;

#[derive(Debug, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub parent_id: Option<i64>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub parent_id: Option<i64>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

/// A department with its children, for the tree endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentNode {
    #[serde(flatten)]
    pub department: Department,
    pub children: Vec<DepartmentNode>,
}

pub async fn list(pool: &SqlitePool, page: i64, page_size: i64) -> sqlx::Result<Page<Department>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE is_delete = 0")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Department>(
        "SELECT * FROM departments WHERE is_delete = 0 ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    Ok(Page { total, items })
}

pub async fn list_all(pool: &SqlitePool) -> sqlx::Result<Vec<Department>> {
    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE is_delete = 0 ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Department>> {
    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ? AND is_delete = 0")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<Department>> {
    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE name = ? AND is_delete = 0")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    new: &CreateDepartment,
    create_by: Option<&str>,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO departments (name, parent_id, create_time, update_time, status, \
         is_delete, create_by, remark) \
         VALUES (?, ?, ?, ?, 1, 0, ?, ?)",
    )
    .bind(&new.name)
    .bind(new.parent_id)
    .bind(now)
    .bind(now)
    .bind(create_by)
    .bind(&new.remark)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    update: &UpdateDepartment,
    update_by: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE departments SET \
         name = COALESCE(?, name), \
         parent_id = COALESCE(?, parent_id), \
         status = COALESCE(?, status), \
         remark = COALESCE(?, remark), \
         update_time = ?, \
         update_by = COALESCE(?, update_by) \
         WHERE id = ? AND is_delete = 0",
    )
    .bind(&update.name)
    .bind(update.parent_id)
    .bind(update.status)
    .bind(&update.remark)
    .bind(Utc::now())
    .bind(update_by)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn soft_delete(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE departments SET is_delete = 1, update_time = ? WHERE id = ? AND is_delete = 0",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Assemble flat rows into a forest. Rows whose parent is absent (deleted
/// or null) become roots.
pub fn build_tree(departments: Vec<Department>) -> Vec<DepartmentNode> {
    use std::collections::HashMap;

    let ids: std::collections::HashSet<i64> = departments.iter().map(|d| d.id).collect();
    let mut children_of: HashMap<i64, Vec<Department>> = HashMap::new();
    let mut roots = Vec::new();

    for department in departments {
        match department.parent_id {
            Some(parent_id) if ids.contains(&parent_id) && parent_id != department.id => {
                children_of.entry(parent_id).or_default().push(department);
            }
            _ => roots.push(department),
        }
    }

    fn attach(
        department: Department,
        children_of: &mut std::collections::HashMap<i64, Vec<Department>>,
    ) -> DepartmentNode {
        let children = children_of
            .remove(&department.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children_of))
            .collect();
        DepartmentNode {
            department,
            children,
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children_of))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::AuditColumns;
    use chrono::Utc;

    fn department(id: i64, name: &str, parent_id: Option<i64>) -> Department {
        let now = Utc::now();
        Department {
            id,
            name: name.to_string(),
            parent_id,
            audit: AuditColumns {
                create_time: now,
                update_time: now,
                status: 1,
                is_delete: false,
                create_by: None,
                update_by: None,
                remark: None,
            },
        }
    }

    #[test]
    fn builds_a_two_level_tree() {
        let rows = vec![
            department(1, "HQ", None),
            department(2, "Engineering", Some(1)),
            department(3, "Sales", Some(1)),
            department(4, "Platform", Some(2)),
        ];

        let tree = build_tree(rows);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].department.name, "HQ");
        assert_eq!(tree[0].children.len(), 2);

        let engineering = &tree[0].children[0];
        assert_eq!(engineering.department.name, "Engineering");
        assert_eq!(engineering.children.len(), 1);
        assert_eq!(engineering.children[0].department.name, "Platform");
    }

    #[test]
    fn orphaned_parent_becomes_a_root() {
        let rows = vec![
            department(1, "HQ", None),
            // Parent 99 was soft-deleted and is not in the result set.
            department(2, "Orphan", Some(99)),
        ];

        let tree = build_tree(rows);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn self_reference_does_not_recurse() {
        let rows = vec![department(1, "Loop", Some(1))];
        let tree = build_tree(rows);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }
}
