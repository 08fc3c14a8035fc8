use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::tag::Tag;
use crate::forms::tags::{AddTagForm, EditTagForm};
use crate::repository::{TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Returns every tag ordered by identifier.
pub fn list_tags<R>(repo: &R) -> ServiceResult<Vec<Tag>>
where
    R: TagReader + ?Sized,
{
    Ok(repo.list_tags()?)
}

pub fn get_tag<R>(repo: &R, tag_id: i32) -> ServiceResult<Tag>
where
    R: TagReader + ?Sized,
{
    repo.get_tag_by_id(tag_id)?.ok_or(ServiceError::NotFound)
}

/// Creates a tag. Requires the admin role.
pub fn create_tag<R>(repo: &R, user: &AuthenticatedUser, form: AddTagForm) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    ensure_admin(user)?;

    let new_tag = form
        .into_new_tag()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    ensure_unique(
        repo,
        None,
        Some(new_tag.name.as_str()),
        Some(new_tag.color.as_str()),
        Some(new_tag.slug.as_str()),
    )?;

    let tag = repo.create_tag(&new_tag)?;
    log::info!("Created tag {} ({})", tag.id, tag.slug);
    Ok(tag)
}

/// Updates a tag. Requires the admin role.
pub fn update_tag<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tag_id: i32,
    form: EditTagForm,
) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    ensure_admin(user)?;

    let updates = form
        .into_update_tag()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    ensure_unique(
        repo,
        Some(tag_id),
        updates.name.as_deref(),
        updates.color.as_deref(),
        updates.slug.as_deref(),
    )?;

    Ok(repo.update_tag(tag_id, &updates)?)
}

/// Deletes a tag and detaches it from recipes. Requires the admin role.
pub fn delete_tag<R>(repo: &R, user: &AuthenticatedUser, tag_id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    ensure_admin(user)?;

    repo.delete_tag(tag_id)?;
    log::info!("Deleted tag {tag_id}");
    Ok(())
}

/// Name, colour and slug are unique across tags.
fn ensure_unique<R>(
    repo: &R,
    tag_id: Option<i32>,
    name: Option<&str>,
    color: Option<&str>,
    slug: Option<&str>,
) -> ServiceResult<()>
where
    R: TagReader + ?Sized,
{
    for existing in repo.list_tags()? {
        if Some(existing.id) == tag_id {
            continue;
        }
        if name == Some(existing.name.as_str()) {
            return Err(ServiceError::Conflict("tag name is already taken".to_string()));
        }
        if color == Some(existing.color.as_str()) {
            return Err(ServiceError::Conflict("tag color is already taken".to_string()));
        }
        if slug == Some(existing.slug.as_str()) {
            return Err(ServiceError::Conflict("tag slug is already taken".to_string()));
        }
    }

    Ok(())
}
