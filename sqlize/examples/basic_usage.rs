use sqlize::prelude::*;
use sqlize::JoinKind;
use std::collections::HashMap;

fn show(title: &str, query: &impl QueryBuilder, dialect: &Dialect) -> Result<()> {
    let rendered = query.render(dialect)?;
    println!("{}:", title);
    println!("   SQL: {}", rendered.sql);
    if !rendered.params.is_empty() {
        println!("   Parameters: {:?}", rendered.params);
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    println!("=== sqlize - Basic Usage Examples ===\n");
    let pg = Dialect::postgres();

    // SELECT with tuple shorthand and explicit operators
    let select_query = select(("id", "name", "email"))
        .from("users")
        .where_(("age", op::GT, 18))
        .where_(("status", "active"))
        .and_where(like("city", "%York%"))
        .limit(10)
        .offset(5);
    show("1. Basic SELECT", &select_query, &pg)?;

    // Subqueries
    let completed = select("user_id")
        .from("orders")
        .where_(("status", "completed"))
        .and_where(gt("created_at", "2024-01-01"));
    let subquery_in = select(("id", "name")).from("users").where_in("id", completed);
    show("2. Subquery (WHERE IN)", &subquery_in, &pg)?;

    let published = select(val(1))
        .from("posts")
        .where_(eq("posts.author_id", col("users.id")))
        .and_where(("posts.published", true));
    let subquery_exists = select(("id", "name")).from("users").where_exists(published);
    show("3. Subquery (EXISTS)", &subquery_exists, &pg)?;

    // JOINs with aggregation
    let join_query = select((
        "users.name",
        count_all().alias("post_count"),
        avg("posts.rating").alias("avg_rating"),
    ))
    .from("users")
    .inner_join("posts", "users.id", "posts.author_id")
    .join(
        JoinKind::Left,
        "teams",
        Some(and([
            eq("teams.id", col("users.team_id")),
            is_null("teams.archived_at"),
        ])),
    )?
    .where_(("users.active", true))
    .group_by(("users.id", "users.name"))
    .having(gt(count_all(), 5))
    .order_by("avg_rating", SortDirection::Desc)
    .limit(20);
    show("4. JOINs with aggregation", &join_query, &pg)?;

    // INSERT
    let mut user = HashMap::new();
    user.insert("name", Value::from("John Doe"));
    user.insert("email", Value::from("john@example.com"));
    user.insert("age", Value::from(30));
    let insert_query = insert_into("users").values(user)?.returning("id");
    show("5. INSERT", &insert_query, &pg)?;

    // UPDATE
    let update_query = update("users")
        .set(("email", "newemail@example.com"))
        .set(("login_count", col("login_count") + 1))
        .where_(("id", 123));
    show("6. UPDATE", &update_query, &pg)?;

    // DELETE
    let delete_query = delete_from("users")
        .where_(("status", "inactive"))
        .and_where(lt("last_login", "2023-01-01"));
    show("7. DELETE", &delete_query, &pg)?;

    // Schema
    let users_table = create_table("users")
        .if_not_exists()
        .column(
            ColumnDef::new("id", SqlType::BigInt)
                .primary_key()
                .auto_increment(),
        )
        .column(ColumnDef::new("email", SqlType::Varchar(255)).not_null().unique())
        .column(ColumnDef::new("active", SqlType::Boolean).not_null().default(true));
    show("8. CREATE TABLE", &users_table, &pg)?;

    // Same statements, other dialects
    for dialect in [Dialect::mysql(), Dialect::sqlite()] {
        show(
            &format!("9. SELECT on {}", dialect.name()),
            &select_query,
            &dialect,
        )?;
        show(
            &format!("10. CREATE TABLE on {}", dialect.name()),
            &users_table,
            &dialect,
        )?;
    }

    // Unsupported constructs are reported, not silently rewritten
    match insert_query.render(&Dialect::mysql()) {
        Ok(rendered) => println!("unexpected: {}", rendered.sql),
        Err(err) => println!("11. RETURNING on mysql: {}", err),
    }

    Ok(())
}
