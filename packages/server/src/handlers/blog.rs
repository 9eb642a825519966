use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::PostStatus;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::blog_post;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::blog::*;
use crate::models::shared::{MessageResponse, contains_ci, page_offset, page_params};
use crate::models::upload::ImageUploadResponse;
use crate::state::AppState;
use crate::utils::upload::{UploadPolicy, read_file_field, store_all};

#[utoipa::path(
    get,
    path = "/api/blog/posts",
    tag = "Blog",
    operation_id = "listPublishedPosts",
    summary = "List published posts",
    description = "Published, non-deleted posts, newest first. `search` matches title and excerpt case-insensitively.",
    params(PublicPostListQuery),
    responses(
        (status = 200, description = "List of posts", body = PostListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_published_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PublicPostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = blog_post::Entity::find()
        .filter(blog_post::Column::Status.eq(PostStatus::Published))
        .filter(blog_post::Column::DeletedAt.is_null());
    select = apply_search(select, query.search.as_deref());

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let posts = select
        .order_by_desc(blog_post::Column::PublishedAt)
        .order_by_desc(blog_post::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(PostListResponse {
        message: "Posts retrieved successfully".into(),
        posts,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/blog/posts/slug/{slug}",
    tag = "Blog",
    operation_id = "getPostBySlug",
    summary = "Get a published post by slug",
    description = "Returns a published, non-deleted post and counts the view.",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = PostEnvelope),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    let mut post = blog_post::Entity::find()
        .filter(blog_post::Column::Slug.eq(slug.trim()))
        .filter(blog_post::Column::Status.eq(PostStatus::Published))
        .filter(blog_post::Column::DeletedAt.is_null())
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    blog_post::Entity::update_many()
        .col_expr(
            blog_post::Column::ViewCount,
            Expr::col(blog_post::Column::ViewCount).add(1),
        )
        .filter(blog_post::Column::Id.eq(post.id))
        .exec(&state.db)
        .await?;
    post.view_count += 1;

    Ok(Json(PostEnvelope {
        message: "Post retrieved successfully".into(),
        post: post.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/blog/check-slug",
    tag = "Blog",
    operation_id = "checkSlug",
    summary = "Check slug availability",
    description = "Slugifies the candidate and reports whether any post, including soft-deleted ones, already uses it. `exclude_id` ignores the post being edited.",
    params(CheckSlugQuery),
    responses(
        (status = 200, description = "Availability", body = SlugAvailability),
        (status = 400, description = "Candidate has no usable characters (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn check_slug(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CheckSlugQuery>,
) -> Result<Json<SlugAvailability>, AppError> {
    let slug = resolve_slug(Some(&query.slug), "")?;
    let available = slug_owner(&state.db, &slug, query.exclude_id)
        .await?
        .is_none();
    Ok(Json(SlugAvailability { slug, available }))
}

#[utoipa::path(
    get,
    path = "/api/blog/admin/posts",
    tag = "Blog",
    operation_id = "listPostsAdmin",
    summary = "List all posts",
    description = "Drafts and published posts, most recently updated first. Soft-deleted posts are included only with `include_deleted=true`.",
    params(AdminPostListQuery),
    responses(
        (status = 200, description = "List of posts", body = PostListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_posts_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AdminPostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    auth_user.require_admin()?;

    let (page, per_page) = page_params(query.page, query.per_page);
    let mut select = blog_post::Entity::find();

    if let Some(status) = query.status_filter()? {
        select = select.filter(blog_post::Column::Status.eq(status));
    }
    if !query.include_deleted.unwrap_or(false) {
        select = select.filter(blog_post::Column::DeletedAt.is_null());
    }
    select = apply_search(select, query.search.as_deref());

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let posts = select
        .order_by_desc(blog_post::Column::UpdatedAt)
        .order_by_desc(blog_post::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(PostListResponse {
        message: "Posts retrieved successfully".into(),
        posts,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blog/admin/posts",
    tag = "Blog",
    operation_id = "createPost",
    summary = "Create a post",
    description = "Creates a draft (or published) post authored by the caller. The slug is derived from `slug` or the title and must be unused.",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostEnvelope),
        (status = 400, description = "Validation error or slug taken (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let status = validate_create_post(&payload)?;
    let slug = resolve_slug(payload.slug.as_deref(), &payload.title)?;
    ensure_slug_available(&state.db, &slug, None).await?;

    let now = chrono::Utc::now();
    let new_post = blog_post::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug.clone()),
        content: Set(payload.content),
        excerpt: Set(clean_optional(payload.excerpt)),
        featured_image: Set(clean_optional(payload.featured_image)),
        meta_title: Set(clean_optional(payload.meta_title)),
        meta_description: Set(clean_optional(payload.meta_description)),
        keywords: Set(serde_json::Value::from(clean_keywords(payload.keywords))),
        status: Set(status),
        author_id: Set(auth_user.user_id),
        published_at: Set((status == PostStatus::Published).then_some(now)),
        view_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let post = new_post
        .insert(&state.db)
        .await
        .map_err(|e| slug_conflict(e, &slug))?;
    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(PostEnvelope {
            message: "Post created successfully".into(),
            post: post.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/blog/admin/stats",
    tag = "Blog",
    operation_id = "postStats",
    summary = "Post counts",
    description = "`total`, `published` and `draft` count non-deleted posts. `total_views` sums views over non-deleted posts.",
    responses(
        (status = 200, description = "Statistics", body = PostStatsResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn post_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PostStatsResponse>, AppError> {
    auth_user.require_admin()?;

    let live = || blog_post::Entity::find().filter(blog_post::Column::DeletedAt.is_null());

    let published = live()
        .filter(blog_post::Column::Status.eq(PostStatus::Published))
        .count(&state.db)
        .await?;
    let draft = live()
        .filter(blog_post::Column::Status.eq(PostStatus::Draft))
        .count(&state.db)
        .await?;
    let deleted = blog_post::Entity::find()
        .filter(blog_post::Column::DeletedAt.is_not_null())
        .count(&state.db)
        .await?;
    let total_views = live()
        .select_only()
        .column_as(
            Expr::cust("COALESCE(SUM(\"view_count\"), 0)::BIGINT"),
            "total_views",
        )
        .into_tuple::<i64>()
        .one(&state.db)
        .await?
        .unwrap_or(0);

    Ok(Json(PostStatsResponse {
        message: "Statistics retrieved successfully".into(),
        stats: PostStats {
            total: published + draft,
            published,
            draft,
            deleted,
            total_views,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/api/blog/admin/upload-image",
    tag = "Blog",
    operation_id = "uploadPostImage",
    summary = "Upload a blog image",
    description = "Multipart upload of a single image in the `image` (or `file`) field. Returns the public URL to use as `featured_image` or inline.",
    request_body(content_type = "multipart/form-data", description = "`image` or `file` part"),
    responses(
        (status = 201, description = "Image stored", body = ImageUploadResponse),
        (status = 400, description = "Rejected file (FILE_UPLOAD_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 502, description = "Storage failed (EXTERNAL_SERVICE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_post_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let policy = UploadPolicy::images(state.config.uploads.image_max_bytes);

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if matches!(field.name(), Some("image") | Some("file")) {
            if image.is_some() {
                return Err(AppError::FileUpload(
                    "Only one image may be uploaded at a time".into(),
                ));
            }
            image = Some(read_file_field(field, &policy).await?);
        }
    }

    let image = image.ok_or_else(|| AppError::FileUpload("No image provided".into()))?;
    let file = store_all(&*state.store, "blog/images", vec![image])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Image upload produced no file".into()))?;

    tracing::info!(key = %file.key, by = %auth_user.user_id, "Stored blog image");

    Ok((
        StatusCode::CREATED,
        Json(ImageUploadResponse {
            message: "Image uploaded successfully".into(),
            file,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/blog/admin/posts/{id}",
    tag = "Blog",
    operation_id = "getPostAdmin",
    summary = "Get any post by ID",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = PostEnvelope),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_post_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    let post = find_post(&state.db, parse_id(&id)?).await?;
    Ok(Json(PostEnvelope {
        message: "Post retrieved successfully".into(),
        post: post.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/blog/admin/posts/{id}",
    tag = "Blog",
    operation_id = "updatePost",
    summary = "Edit a post",
    description = "Partially updates a post using PATCH semantics. The slug only changes when `slug` is sent. Soft-deleted posts cannot be edited.",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostEnvelope),
        (status = 400, description = "Validation error, slug taken (VALIDATION_ERROR) or post deleted (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    validate_update_post(&payload)?;

    let post = find_post(&state.db, parse_id(&id)?).await?;
    ensure_not_deleted(&post, "edit")?;

    let new_slug = match payload.slug.as_deref() {
        Some(explicit) => {
            let title = payload.title.as_deref().unwrap_or(&post.title);
            let slug = resolve_slug(Some(explicit), title)?;
            if slug != post.slug {
                ensure_slug_available(&state.db, &slug, Some(post.id)).await?;
                Some(slug)
            } else {
                None
            }
        }
        None => None,
    };

    let mut active: blog_post::ActiveModel = post.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(ref slug) = new_slug {
        active.slug = Set(slug.clone());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(excerpt) = payload.excerpt {
        active.excerpt = Set(clean_optional(excerpt));
    }
    if let Some(featured_image) = payload.featured_image {
        active.featured_image = Set(clean_optional(featured_image));
    }
    if let Some(meta_title) = payload.meta_title {
        active.meta_title = Set(clean_optional(meta_title));
    }
    if let Some(meta_description) = payload.meta_description {
        active.meta_description = Set(clean_optional(meta_description));
    }
    if let Some(keywords) = payload.keywords {
        active.keywords = Set(serde_json::Value::from(clean_keywords(keywords)));
    }

    if !active.is_changed() {
        let unchanged = active
            .try_into_model()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(Json(PostEnvelope {
            message: "Post updated successfully".into(),
            post: unchanged.into(),
        }));
    }

    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await.map_err(|e| match new_slug {
        Some(ref slug) => slug_conflict(e, slug),
        None => AppError::from(e),
    })?;

    Ok(Json(PostEnvelope {
        message: "Post updated successfully".into(),
        post: updated.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blog/admin/posts/{id}/publish",
    tag = "Blog",
    operation_id = "publishPost",
    summary = "Publish a post",
    description = "Sets the status to `published`. `published_at` is set the first time only.",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post published", body = PostEnvelope),
        (status = 400, description = "Post deleted (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn publish_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    let post = find_post(&state.db, parse_id(&id)?).await?;
    ensure_not_deleted(&post, "publish")?;

    let now = chrono::Utc::now();
    let first_publish = post.published_at.is_none();
    let mut active: blog_post::ActiveModel = post.into();
    active.status = Set(PostStatus::Published);
    if first_publish {
        active.published_at = Set(Some(now));
    }
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    tracing::info!(post_id = %updated.id, first_publish, "Post published");

    Ok(Json(PostEnvelope {
        message: "Post published successfully".into(),
        post: updated.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blog/admin/posts/{id}/unpublish",
    tag = "Blog",
    operation_id = "unpublishPost",
    summary = "Unpublish a post",
    description = "Returns the post to `draft`. `published_at` is kept.",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post unpublished", body = PostEnvelope),
        (status = 400, description = "Post deleted (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn unpublish_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    let post = find_post(&state.db, parse_id(&id)?).await?;
    ensure_not_deleted(&post, "unpublish")?;

    let mut active: blog_post::ActiveModel = post.into();
    active.status = Set(PostStatus::Draft);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(PostEnvelope {
        message: "Post unpublished successfully".into(),
        post: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/blog/admin/posts/{id}",
    tag = "Blog",
    operation_id = "deletePost",
    summary = "Soft-delete a post",
    description = "Hides the post from every listing by setting `deleted_at`. The slug stays reserved.",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = PostEnvelope),
        (status = 400, description = "Already deleted (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    let post = find_post(&state.db, parse_id(&id)?).await?;
    if post.is_deleted() {
        return Err(AppError::BadRequest("Post is already deleted".into()));
    }

    let now = chrono::Utc::now();
    let mut active: blog_post::ActiveModel = post.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    tracing::info!(post_id = %updated.id, by = %auth_user.user_id, "Post soft-deleted");

    Ok(Json(PostEnvelope {
        message: "Post deleted successfully".into(),
        post: updated.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blog/admin/posts/{id}/restore",
    tag = "Blog",
    operation_id = "restorePost",
    summary = "Restore a soft-deleted post",
    description = "Clears `deleted_at`. The post keeps its previous status.",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post restored", body = PostEnvelope),
        (status = 400, description = "Post not deleted (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn restore_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostEnvelope>, AppError> {
    auth_user.require_admin()?;
    let post = find_post(&state.db, parse_id(&id)?).await?;
    if !post.is_deleted() {
        return Err(AppError::BadRequest("Post is not deleted".into()));
    }

    let mut active: blog_post::ActiveModel = post.into();
    active.deleted_at = Set(None);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(PostEnvelope {
        message: "Post restored successfully".into(),
        post: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/blog/admin/posts/{id}/permanent",
    tag = "Blog",
    operation_id = "permanentlyDeletePost",
    summary = "Permanently delete a post",
    description = "Removes the row. Requires the `super_admin` role.",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post removed", body = MessageResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn permanently_delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_super_admin()?;
    let id = parse_id(&id)?;

    let result = blog_post::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }
    tracing::info!(post_id = %id, by = %auth_user.user_id, "Post permanently deleted");

    Ok(Json(MessageResponse {
        message: "Post permanently deleted".into(),
    }))
}

fn not_found() -> AppError {
    AppError::NotFound("Post not found".into())
}

/// Parse a path ID. Malformed IDs cannot match any row.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found())
}

fn ensure_not_deleted(post: &blog_post::Model, action: &str) -> Result<(), AppError> {
    if post.is_deleted() {
        return Err(AppError::BadRequest(format!(
            "Cannot {action} a deleted post. Restore it first"
        )));
    }
    Ok(())
}

fn apply_search(select: Select<blog_post::Entity>, search: Option<&str>) -> Select<blog_post::Entity> {
    let term = escape_like(search.unwrap_or_default().trim());
    if term.is_empty() {
        return select;
    }
    select.filter(
        Condition::any()
            .add(contains_ci(blog_post::Column::Title, &term))
            .add(contains_ci(blog_post::Column::Excerpt, &term)),
    )
}

/// Post currently holding `slug`, ignoring `exclude`. Soft-deleted posts count.
async fn slug_owner<C: ConnectionTrait>(
    db: &C,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    let mut select = blog_post::Entity::find()
        .select_only()
        .column(blog_post::Column::Id)
        .filter(blog_post::Column::Slug.eq(slug));
    if let Some(id) = exclude {
        select = select.filter(blog_post::Column::Id.ne(id));
    }
    Ok(select.into_tuple::<Uuid>().one(db).await?)
}

async fn ensure_slug_available<C: ConnectionTrait>(
    db: &C,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    match slug_owner(db, slug, exclude).await? {
        Some(_) => Err(slug_taken(slug)),
        None => Ok(()),
    }
}

fn slug_taken(slug: &str) -> AppError {
    AppError::Validation(format!("Slug '{slug}' is already in use"))
}

/// Map a unique violation on insert/update (lost race on the slug) to the slug error.
fn slug_conflict(err: DbErr, slug: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => slug_taken(slug),
        _ => AppError::from(err),
    }
}

async fn find_post<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<blog_post::Model, AppError> {
    blog_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}
