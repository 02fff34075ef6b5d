//! Basic usage example for sqlforge
//!
//! Run with: cargo run --example basic -p sqlforge

use sqlforge::prelude::*;

#[derive(Debug, Table)]
#[table(name = "app_user", logical = "user")]
#[allow(dead_code)]
struct User {
    #[column(name = "user_id")]
    id: i64,
    #[column(name = "user_email", encrypted)]
    email: String,
    #[column(name = "user_pw", password)]
    password: String,
    #[column(name = "user_cc")]
    cc: i32,
}

fn main() -> Result<(), SqlError> {
    let dialect = PostgresDialect::new();
    let user = User::referenced()?;

    // Register
    let sql = insert_into(&user)
        .set("email", param("email"))?
        .set("password", param("password"))?
        .to_sql(&dialect)?;
    println!("{sql}\n");

    // Login check
    let sql = select(&user)
        .field(user.field("id")?)
        .filter(user.field("email")?.read().eq(param("email")))
        .filter(
            user.field("password")?
                .read_with(param("password"))
                .eq(user.field("password")?),
        )
        .to_sql(&dialect)?;
    println!("{sql}\n");

    // Change email, bumping the concurrency counter
    let sql = update(&user)
        .set("email", param("email"))?
        .filter(user.field("id")?.eq(param("id")))
        .filter(user.field("cc")?.eq(param("cc")))
        .to_sql(&dialect)?;
    println!("{sql}");

    Ok(())
}
