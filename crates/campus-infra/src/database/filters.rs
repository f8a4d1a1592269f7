//! Translation of typed feed filters into parameterized SQL conditions.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition};

use campus_core::domain::PostFilter;

use super::entity::post;

/// Conditions for listing live posts. Every value is bound as a parameter.
pub fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all().add(post::Column::DeletedAt.is_null());

    if let Some(tag) = &filter.hashtag {
        condition = condition.add(Expr::cust_with_values(
            r#"? = ANY("posts"."hashtags")"#,
            [tag.clone()],
        ));
    }
    if let Some(club_id) = filter.club_id {
        condition = condition.add(post::Column::ClubId.eq(club_id));
    }
    if let Some(house_id) = filter.house_id {
        condition = condition.add(post::Column::HouseId.eq(house_id));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col((post::Entity, post::Column::Description))))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    condition
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};
    use uuid::Uuid;

    fn sql_for(filter: &PostFilter) -> String {
        post::Entity::find()
            .filter(post_condition(filter))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_empty_filter_only_hides_deleted() {
        let sql = sql_for(&PostFilter::default());
        assert!(sql.contains(r#""posts"."deleted_at" IS NULL"#));
        assert!(!sql.contains("ANY"));
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn test_all_filters_combine_with_and() {
        let club = Uuid::new_v4();
        let sql = sql_for(&PostFilter {
            hashtag: Some("sports".to_string()),
            club_id: Some(club),
            house_id: None,
            search: Some("Meet".to_string()),
        });

        assert!(sql.contains(r#"'sports' = ANY("posts"."hashtags")"#));
        assert!(sql.contains(&club.to_string()));
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("'%meet%'"));
        assert!(!sql.contains("house_id\" ="));
    }

    #[test]
    fn test_search_input_is_bound_not_spliced() {
        assert_eq!(escape_like("100%_off"), r"100\%\_off");

        let statement = post::Entity::find()
            .filter(post_condition(&PostFilter {
                search: Some("'; DROP TABLE posts; --".to_string()),
                ..Default::default()
            }))
            .build(DbBackend::Postgres);

        assert!(statement.sql.contains("LIKE $"));
        assert!(!statement.sql.contains("DROP"));
    }
}
