use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use super::UserData;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;
    let command = body.try_into_command().map_err(ApiError::Validation)?;

    state
        .auth_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for account registration (raw JSON).
///
/// Every field is optional at the wire level so that missing values are reported in
/// the field error map instead of as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    #[serde(alias = "confirmPassword")]
    confirm_password: Option<String>,
    name: Option<String>,
    #[serde(alias = "userType")]
    role: Option<String>,
    biography: Option<String>,
    #[serde(alias = "profileImageUrl")]
    profile_image_url: Option<String>,
    gender: Option<String>,
    #[serde(alias = "birthDate")]
    birth_date: Option<String>,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required(&mut errors, "username", self.username)
            .and_then(|value| record(&mut errors, "username", Username::new(value)));

        let email = required(&mut errors, "email", self.email)
            .and_then(|value| record(&mut errors, "email", EmailAddress::new(value)));

        let password = required(&mut errors, "password", self.password).and_then(|value| {
            if value.chars().count() < MIN_PASSWORD_LENGTH {
                errors.insert(
                    "password".to_string(),
                    format!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LENGTH
                    ),
                );
                None
            } else {
                Some(value)
            }
        });

        if let (Some(password), Some(confirmation)) = (&password, &self.confirm_password) {
            if password != confirmation {
                errors.insert(
                    "confirm_password".to_string(),
                    "Passwords do not match".to_string(),
                );
            }
        }

        let name = required(&mut errors, "name", self.name);

        let role = match self.role.filter(|role| !role.trim().is_empty()) {
            Some(role) => record(&mut errors, "role", role.trim().parse::<Role>()),
            None => Some(Role::default()),
        };

        let birth_date = match self.birth_date.filter(|date| !date.trim().is_empty()) {
            Some(date) => record(&mut errors, "birth_date", date.trim().parse::<NaiveDate>())
                .map(Some),
            None => Some(None),
        };

        match (username, email, password, name, role, birth_date) {
            (Some(username), Some(email), Some(password), Some(name), Some(role), Some(birth_date))
                if errors.is_empty() =>
            {
                Ok(RegisterCommand {
                    username,
                    email,
                    password,
                    name: name.trim().to_string(),
                    role,
                    biography: self.biography,
                    profile_image_url: self.profile_image_url,
                    gender: self.gender,
                    birth_date,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            errors.insert(field.to_string(), format!("{} is required", field));
            None
        }
    }
}

fn record<T, E: std::fmt::Display>(
    errors: &mut FieldErrors,
    field: &str,
    result: Result<T, E>,
) -> Option<T> {
    result
        .map_err(|e| {
            errors.insert(field.to_string(), e.to_string());
        })
        .ok()
}
