//! User route handlers.

use axum::extract::{Path, State};

use culinary_core::UserId;
use culinary_core::validation::{Mode, USER};

use super::extract::Payload;
use crate::envelope::{Created, Envelope};
use crate::error::{AppError, Result};
use crate::integrity;
use crate::models::{Entity, NewUser, OwnerSummary, RecipeDoc, User, UserChanges};
use crate::query::{self, RecipeFilter, UserFilter};
use crate::state::AppState;

/// `GET /api/users`
pub async fn list(State(state): State<AppState>) -> Result<Envelope<Vec<User>>> {
    let users = state.store().list_users(&UserFilter::default()).await?;
    Ok(Envelope::list("Usuarios obtenidos exitosamente", users))
}

/// `GET /api/users/{id}`
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Envelope<User>> {
    let id = UserId::parse(&id)?;
    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or(AppError::NotFound(Entity::User))?;
    Ok(Envelope::new("Usuario obtenido exitosamente", user))
}

/// `POST /api/users`
pub async fn create(State(state): State<AppState>, payload: Payload) -> Result<Created<User>> {
    let new: NewUser = payload.validate(&USER, Mode::Create)?;
    let user = state.store().insert_user(new).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(Created(Envelope::new("Usuario creado exitosamente", user)))
}

/// `PUT /api/users/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Payload,
) -> Result<Envelope<User>> {
    let id = UserId::parse(&id)?;
    let changes: UserChanges = payload.validate(&USER, Mode::Update)?;
    let user = state
        .store()
        .update_user(id, changes)
        .await?
        .ok_or(AppError::NotFound(Entity::User))?;
    Ok(Envelope::new("Usuario actualizado exitosamente", user))
}

/// `DELETE /api/users/{id}`: also removes the user's recipes and their
/// ingredients.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<User>> {
    let id = UserId::parse(&id)?;
    let (user, _report) = integrity::cascade_delete_user(state.store(), id).await?;
    Ok(Envelope::new("Usuario eliminado exitosamente", user))
}

/// `GET /api/users/{id}/recipes`
pub async fn recipes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<Vec<RecipeDoc<Option<OwnerSummary>>>>> {
    let id = UserId::parse(&id)?;
    let store = state.store();
    if !integrity::check_owner_exists(store, id).await? {
        return Err(AppError::NotFound(Entity::User));
    }

    let recipes = store.list_recipes(&RecipeFilter::owned_by(id)).await?;
    let docs = query::populate_owners(store, recipes).await?;
    Ok(Envelope::list("Recetas del usuario obtenidas exitosamente", docs))
}
