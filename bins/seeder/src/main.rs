//! Database seeder for Kantor development and testing.
//!
//! Seeds an admin, an accountant, a client, and a couple of service
//! packages for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use kantor_core::auth::hash_password;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use kantor_db::entities::{sea_orm_active_enums::UserRole, service_packages, users};

/// Seed admin ID (consistent for all seeds)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Seed accountant ID
const AKUNTAN_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Seed client ID
const KLIEN_ID: &str = "00000000-0000-0000-0000-000000000003";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = kantor_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding service packages...");
    seed_service_packages(&db).await;

    println!("Seeding complete!");
}

/// Seeds one user per role with a known password (`rahasia123`).
async fn seed_users(db: &DatabaseConnection) {
    let password_hash = hash_password("rahasia123").expect("Failed to hash seed password");

    let seeds = [
        (ADMIN_ID, "admin@kantor.dev", "Admin Kantor", UserRole::Admin),
        (
            AKUNTAN_ID,
            "akuntan@kantor.dev",
            "Akuntan Kantor",
            UserRole::Akuntan,
        ),
        (KLIEN_ID, "klien@kantor.dev", "Klien Contoh", UserRole::Klien),
    ];

    for (id, email, full_name, role) in seeds {
        let id = Uuid::parse_str(id).expect("Invalid seed UUID");

        if users::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let user = users::ActiveModel {
            id: Set(id),
            full_name: Set(full_name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.clone()),
            phone: Set(None),
            address: Set(None),
            role: Set(role),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {email}: {e}");
        } else {
            println!("  Created user: {email}");
        }
    }
}

/// Seeds a couple of service packages.
async fn seed_service_packages(db: &DatabaseConnection) {
    let packages = [
        (
            "Laporan Pajak Tahunan",
            "Penyusunan dan pelaporan SPT tahunan badan usaha",
            "1000000",
            "14 hari",
            "pajak",
        ),
        (
            "Pembukuan Bulanan",
            "Pembukuan lengkap per bulan termasuk rekonsiliasi bank",
            "750000",
            "30 hari",
            "pembukuan",
        ),
    ];

    let mut inserted = 0;
    for (name, description, price, duration, category) in packages {
        let package = service_packages::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            price: Set(Decimal::from_str(price).expect("Invalid seed price")),
            duration: Set(duration.to_string()),
            category: Set(Some(category.to_string())),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = package.insert(db).await {
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert service package {name}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} service packages");
}
