//! # Create User
//!
//! Stores a login with an argon2-hashed password.
//!
//! ```bash
//! cargo run -p mostrador-db --bin create-user -- caja1 's3creta'
//! cargo run -p mostrador-db --bin create-user -- caja1 's3creta' --db ./data/mostrador.db
//! ```

use std::env;

use mostrador_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut positional = Vec::new();
    let mut db_path = String::from("./mostrador_dev.db");

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let [username, password] = positional.as_slice() else {
        eprintln!("Usage: create-user <USERNAME> <PASSWORD> [--db <PATH>]");
        std::process::exit(2);
    };

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let user = db.users().create(username, password).await?;

    println!("✓ User '{}' created (id {})", user.username, user.id);
    Ok(())
}
