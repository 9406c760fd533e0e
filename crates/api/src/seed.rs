//! Demo data for a fresh deployment.
//!
//! Creates a patient (`patient` / `password123`) and a doctor
//! (`doctor` / `password123`), the patient's default categories and a
//! condition summary. The patient is inserted first so it receives the id
//! the demo share tokens point at.

use medirec_core::categories::DEFAULT_CATEGORIES;
use medirec_core::roles::{ROLE_DOCTOR, ROLE_PATIENT};
use medirec_core::sharing::{DEMO_PATIENT_ID, DEMO_PATIENT_USERNAME};
use medirec_db::models::user::CreateUser;
use medirec_db::repositories::Repositories;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

pub const DEMO_PASSWORD: &str = "password123";

const DEMO_CONDITION: &str = "Type 2 diabetes diagnosed 2019, managed with metformin. \
                              Mild hypertension. Allergic to penicillin.";

/// Seed demo data if the store has no users. Returns `true` if data was inserted.
pub async fn seed_demo_data(repos: &Repositories) -> AppResult<bool> {
    if repos.users.count().await? > 0 {
        return Ok(false);
    }

    let (patient, categories) = repos
        .users
        .create_with_categories(
            &demo_user(
                DEMO_PATIENT_USERNAME,
                "John Doe",
                ROLE_PATIENT,
                "patient@example.com",
            )?,
            DEFAULT_CATEGORIES,
        )
        .await?;
    if patient.id != DEMO_PATIENT_ID {
        tracing::warn!(
            patient_id = patient.id,
            expected = DEMO_PATIENT_ID,
            "Demo patient did not get the id the demo share tokens use"
        );
    }

    let doctor = repos
        .users
        .create(&demo_user(
            "doctor",
            "Dr. Jane Smith",
            ROLE_DOCTOR,
            "doctor@example.com",
        )?)
        .await?;

    repos.conditions.upsert(patient.id, DEMO_CONDITION).await?;

    tracing::info!(
        patient_id = patient.id,
        doctor_id = doctor.id,
        categories = categories.len(),
        "Demo data seeded"
    );
    Ok(true)
}

fn demo_user(
    username: &str,
    display_name: &str,
    role: &str,
    email: &str,
) -> AppResult<CreateUser> {
    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    Ok(CreateUser {
        username: username.to_string(),
        password_hash,
        display_name: display_name.to_string(),
        role: role.to_string(),
        email: Some(email.to_string()),
    })
}
