//! Initial database migration.
//!
//! Creates the enums and tables for the office portal: users, service
//! packages, orders, payments, documents, revisions, and activity logs.
//!
//! Payments, documents, and revisions reference orders WITHOUT
//! ON DELETE CASCADE: teardown is performed leaf-first by the
//! repositories, inside explicit database transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DIRECTORY & CATALOG
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(SERVICE_PACKAGES_SQL).await?;

        // ============================================================
        // PART 3: ORDER LIFECYCLE
        // ============================================================
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(REVISIONS_SQL).await?;

        // ============================================================
        // PART 4: AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(ACTIVITY_LOGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM (
    'ADMIN',
    'AKUNTAN',
    'KLIEN'
);

-- Order lifecycle status
CREATE TYPE order_status AS ENUM (
    'PENDING_PAYMENT',
    'PAID',
    'IN_PROGRESS',
    'COMPLETED'
);

-- Payment status
CREATE TYPE payment_status AS ENUM (
    'UNPAID',
    'PENDING_APPROVAL',
    'PAID'
);

-- Revision status
CREATE TYPE revision_status AS ENUM (
    'PENDING',
    'IN_PROGRESS',
    'COMPLETED',
    'REJECTED'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    phone VARCHAR(30),
    address TEXT,
    role user_role NOT NULL DEFAULT 'KLIEN',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_users_role ON users(role);
";

const SERVICE_PACKAGES_SQL: &str = r"
CREATE TABLE service_packages (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    price NUMERIC(19,4) NOT NULL,
    duration VARCHAR(50) NOT NULL,
    category VARCHAR(100),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_price_non_negative CHECK (price >= 0)
);

CREATE INDEX idx_service_packages_active ON service_packages(is_active);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    client_id UUID NOT NULL REFERENCES users(id),
    service_id UUID NOT NULL REFERENCES service_packages(id),
    accountant_id UUID REFERENCES users(id),

    -- Snapshot of the package price at creation time
    total_amount NUMERIC(19,4) NOT NULL,
    status order_status NOT NULL DEFAULT 'PENDING_PAYMENT',
    notes TEXT,

    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_orders_client ON orders(client_id);
CREATE INDEX idx_orders_service ON orders(service_id);
CREATE INDEX idx_orders_status ON orders(status);
CREATE INDEX idx_orders_created ON orders(created_at DESC);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    -- One payment per order, no cascade: cleanup is manual and transactional
    order_id UUID NOT NULL UNIQUE REFERENCES orders(id),
    amount NUMERIC(19,4) NOT NULL,
    status payment_status NOT NULL DEFAULT 'UNPAID',
    payment_method VARCHAR(50),
    proof_url TEXT,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_payments_status ON payments(status);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id),
    uploader_id UUID NOT NULL REFERENCES users(id),
    file_name VARCHAR(255) NOT NULL,
    file_url TEXT NOT NULL,
    file_type VARCHAR(50),
    is_result BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_documents_order ON documents(order_id);
CREATE INDEX idx_documents_uploader ON documents(uploader_id);
";

const REVISIONS_SQL: &str = r"
CREATE TABLE revisions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id),
    requester_id UUID NOT NULL REFERENCES users(id),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    status revision_status NOT NULL DEFAULT 'PENDING',
    assigned_to UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_revisions_order ON revisions(order_id);
CREATE INDEX idx_revisions_status ON revisions(status);
";

const ACTIVITY_LOGS_SQL: &str = r"
CREATE TABLE activity_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    action VARCHAR(100) NOT NULL,
    detail TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_activity_logs_user ON activity_logs(user_id);
CREATE INDEX idx_activity_logs_created ON activity_logs(created_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS activity_logs;
DROP TABLE IF EXISTS revisions;
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS service_packages;
DROP TABLE IF EXISTS users;

DROP TYPE IF EXISTS revision_status;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS order_status;
DROP TYPE IF EXISTS user_role;
";
