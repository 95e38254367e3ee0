use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::models::content::{ContentItem, ContentStatus, ContentUpdate, Engagement, NewContent};
use crate::models::context::{
    AiFeedback, ContentContext, InteractionKind, InteractionRecord, NewInteraction, NO_CONTENT_ID,
};
use crate::models::guideline::{
    BrandGuideline, DetectedTone, NewGuideline, Platform, SourceType, TargetAudience,
};
use crate::storage::{Storage, StorageError};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    /// Applies embedded migrations.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn owned_row_check(
        &self,
        table_entity: &'static str,
        sql: &str,
        id: i64,
        user_id: i64,
    ) -> Result<(), StorageError> {
        let owner: Option<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            None => Err(StorageError::NotFound {
                entity: table_entity,
                id,
            }),
            Some(owner) if owner != user_id => Err(StorageError::Forbidden {
                entity: table_entity,
                id,
            }),
            Some(_) => Ok(()),
        }
    }
}

#[derive(Debug, FromRow)]
struct GuidelineRow {
    id: i64,
    user_id: i64,
    name: String,
    industry: String,
    target_audience: Json<TargetAudience>,
    preferred_platforms: Json<Vec<Platform>>,
    core_values: Vec<String>,
    competitors: Vec<String>,
    use_emojis: bool,
    formality_scale: i32,
    voice: String,
    tone: String,
    detected_tone: Option<Json<DetectedTone>>,
    style: String,
    keywords: Vec<String>,
    sample_captions: Json<Vec<String>>,
    hashtag_recommendations: Vec<String>,
    source_type: String,
    source_url: Option<String>,
    created: DateTime<Utc>,
}

impl TryFrom<GuidelineRow> for BrandGuideline {
    type Error = StorageError;

    fn try_from(row: GuidelineRow) -> Result<Self, Self::Error> {
        let source_type = SourceType::parse(&row.source_type).ok_or_else(|| {
            StorageError::Corrupt(format!(
                "guideline {} has unknown source_type '{}'",
                row.id, row.source_type
            ))
        })?;
        Ok(BrandGuideline {
            id: row.id,
            user_id: row.user_id,
            fields: NewGuideline {
                name: row.name,
                industry: row.industry,
                target_audience: row.target_audience.0,
                preferred_platforms: row.preferred_platforms.0,
                core_values: row.core_values,
                competitors: row.competitors,
                use_emojis: row.use_emojis,
                formality_scale: row.formality_scale,
                voice: row.voice,
                tone: row.tone,
                detected_tone: row.detected_tone.map(|t| t.0),
                style: row.style,
                keywords: row.keywords,
                sample_captions: row.sample_captions.0,
                hashtag_recommendations: row.hashtag_recommendations,
                source_type,
                source_url: row.source_url,
            },
            created: row.created,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContentRow {
    id: i64,
    user_id: i64,
    guideline_id: i64,
    content: String,
    platform: String,
    status: String,
    scheduled_for: Option<DateTime<Utc>>,
    engagement: Json<Engagement>,
    created: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = StorageError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let platform = Platform::parse(&row.platform).ok_or_else(|| {
            StorageError::Corrupt(format!("content {} has unknown platform", row.id))
        })?;
        let status = ContentStatus::parse(&row.status).ok_or_else(|| {
            StorageError::Corrupt(format!("content {} has unknown status", row.id))
        })?;
        Ok(ContentItem {
            id: row.id,
            user_id: row.user_id,
            guideline_id: row.guideline_id,
            content: row.content,
            platform,
            status,
            scheduled_for: row.scheduled_for,
            engagement: row.engagement.0,
            created: row.created,
        })
    }
}

#[derive(Debug, FromRow)]
struct InteractionRow {
    id: i64,
    user_id: i64,
    content_id: i64,
    interaction_type: String,
    context: Json<ContentContext>,
    ai_feedback: Json<AiFeedback>,
    performance: Json<BTreeMap<String, f64>>,
    created: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for InteractionRecord {
    type Error = StorageError;

    fn try_from(row: InteractionRow) -> Result<Self, Self::Error> {
        let interaction_type = InteractionKind::parse(&row.interaction_type).ok_or_else(|| {
            StorageError::Corrupt(format!("interaction {} has unknown type", row.id))
        })?;
        Ok(InteractionRecord {
            id: row.id,
            user_id: row.user_id,
            content_id: row.content_id,
            interaction_type,
            context: row.context.0,
            ai_feedback: row.ai_feedback.0,
            performance: row.performance.0,
            created: row.created,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StorageError>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const GUIDELINE_COLUMNS: &str = "id, user_id, name, industry, target_audience, preferred_platforms, \
    core_values, competitors, use_emojis, formality_scale, voice, tone, detected_tone, style, \
    keywords, sample_captions, hashtag_recommendations, source_type, source_url, created";

#[async_trait]
impl Storage for PgStore {
    async fn guidelines_for_user(&self, user_id: i64) -> Result<Vec<BrandGuideline>, StorageError> {
        let rows: Vec<GuidelineRow> = sqlx::query_as(&format!(
            "SELECT {GUIDELINE_COLUMNS} FROM brand_guidelines WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn guideline(&self, id: i64) -> Result<Option<BrandGuideline>, StorageError> {
        let row: Option<GuidelineRow> = sqlx::query_as(&format!(
            "SELECT {GUIDELINE_COLUMNS} FROM brand_guidelines WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BrandGuideline::try_from).transpose()
    }

    async fn create_guideline(
        &self,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError> {
        let row: GuidelineRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO brand_guidelines
                (user_id, name, industry, target_audience, preferred_platforms, core_values,
                 competitors, use_emojis, formality_scale, voice, tone, detected_tone, style,
                 keywords, sample_captions, hashtag_recommendations, source_type, source_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {GUIDELINE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&guideline.name)
        .bind(&guideline.industry)
        .bind(Json(&guideline.target_audience))
        .bind(Json(&guideline.preferred_platforms))
        .bind(&guideline.core_values)
        .bind(&guideline.competitors)
        .bind(guideline.use_emojis)
        .bind(guideline.formality_scale)
        .bind(&guideline.voice)
        .bind(&guideline.tone)
        .bind(guideline.detected_tone.as_ref().map(Json))
        .bind(&guideline.style)
        .bind(&guideline.keywords)
        .bind(Json(&guideline.sample_captions))
        .bind(&guideline.hashtag_recommendations)
        .bind(guideline.source_type.as_str())
        .bind(&guideline.source_url)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_guideline(
        &self,
        id: i64,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError> {
        self.owned_row_check(
            "guideline",
            "SELECT user_id FROM brand_guidelines WHERE id = $1",
            id,
            user_id,
        )
        .await?;

        let row: Option<GuidelineRow> = sqlx::query_as(&format!(
            r#"
            UPDATE brand_guidelines SET
                name = $3, industry = $4, target_audience = $5, preferred_platforms = $6,
                core_values = $7, competitors = $8, use_emojis = $9, formality_scale = $10,
                voice = $11, tone = $12, detected_tone = $13, style = $14, keywords = $15,
                sample_captions = $16, hashtag_recommendations = $17, source_type = $18,
                source_url = $19
            WHERE id = $1 AND user_id = $2
            RETURNING {GUIDELINE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&guideline.name)
        .bind(&guideline.industry)
        .bind(Json(&guideline.target_audience))
        .bind(Json(&guideline.preferred_platforms))
        .bind(&guideline.core_values)
        .bind(&guideline.competitors)
        .bind(guideline.use_emojis)
        .bind(guideline.formality_scale)
        .bind(&guideline.voice)
        .bind(&guideline.tone)
        .bind(guideline.detected_tone.as_ref().map(Json))
        .bind(&guideline.style)
        .bind(&guideline.keywords)
        .bind(Json(&guideline.sample_captions))
        .bind(&guideline.hashtag_recommendations)
        .bind(guideline.source_type.as_str())
        .bind(&guideline.source_url)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StorageError::Forbidden {
            entity: "guideline",
            id,
        })?
        .try_into()
    }

    async fn content_for_user(&self, user_id: i64) -> Result<Vec<ContentItem>, StorageError> {
        let rows: Vec<ContentRow> =
            sqlx::query_as("SELECT * FROM content WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    async fn create_content(
        &self,
        user_id: i64,
        content: NewContent,
    ) -> Result<ContentItem, StorageError> {
        let row: ContentRow = sqlx::query_as(
            r#"
            INSERT INTO content (user_id, guideline_id, content, platform, status, scheduled_for)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(content.guideline_id)
        .bind(&content.content)
        .bind(content.platform.as_str())
        .bind(content.status.as_str())
        .bind(content.scheduled_for)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_content(
        &self,
        id: i64,
        user_id: i64,
        update: ContentUpdate,
    ) -> Result<ContentItem, StorageError> {
        self.owned_row_check(
            "content",
            "SELECT user_id FROM content WHERE id = $1",
            id,
            user_id,
        )
        .await?;

        let row: Option<ContentRow> = sqlx::query_as(
            r#"
            UPDATE content SET
                status = COALESCE($3, status),
                engagement = COALESCE($4, engagement)
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.engagement.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StorageError::Forbidden {
            entity: "content",
            id,
        })?
        .try_into()
    }

    async fn context_history(
        &self,
        content_id: i64,
    ) -> Result<Vec<InteractionRecord>, StorageError> {
        let rows: Vec<InteractionRow> =
            sqlx::query_as("SELECT * FROM context_history WHERE content_id = $1 ORDER BY id")
                .bind(content_id)
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    async fn user_context_history(
        &self,
        user_id: i64,
    ) -> Result<Vec<InteractionRecord>, StorageError> {
        let rows: Vec<InteractionRow> =
            sqlx::query_as("SELECT * FROM context_history WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    async fn create_interaction(
        &self,
        interaction: NewInteraction,
    ) -> Result<InteractionRecord, StorageError> {
        if interaction.content_id != NO_CONTENT_ID {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM content WHERE id = $1)")
                    .bind(interaction.content_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(StorageError::Rejected(format!(
                    "content {} does not exist",
                    interaction.content_id
                )));
            }
        }

        let row: InteractionRow = sqlx::query_as(
            r#"
            INSERT INTO context_history
                (user_id, content_id, interaction_type, context, ai_feedback, performance)
            VALUES ($1, $2, $3, $4, $5, '{}')
            RETURNING *
            "#,
        )
        .bind(interaction.user_id)
        .bind(interaction.content_id)
        .bind(interaction.interaction_type.as_str())
        .bind(Json(&interaction.context))
        .bind(Json(&interaction.ai_feedback))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }
}
