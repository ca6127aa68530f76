use crate::dtos::ClassStats;
use crate::models::GradeRecord;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const GRADES_COLLECTION: &str = "grades";

/// How many raw records the debug route returns at most.
const DEBUG_SAMPLE_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        let mongo = Self { client, db };

        // The driver only parses the URI here; ping so an unreachable server
        // fails startup instead of surfacing on the first request.
        mongo.health_check().await.map_err(|e| {
            tracing::error!("MongoDB unreachable at {}: {}", uri, e);
            e
        })?;
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(mongo)
    }

    /// Creates the three lookup indexes on the grades collection.
    ///
    /// Index creation is a no-op on the server side when an identical index
    /// already exists, so this is safe to run on every startup.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for grades-service");

        let grades = self.grades();

        let class_id_index = IndexModel::builder()
            .keys(doc! { "class_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("class_id_lookup".to_string())
                    .build(),
            )
            .build();

        grades.create_index(class_id_index, None).await.map_err(|e| {
            tracing::error!("Failed to create class_id index on grades collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on grades.class_id");

        let learner_id_index = IndexModel::builder()
            .keys(doc! { "learner_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("learner_id_lookup".to_string())
                    .build(),
            )
            .build();

        grades
            .create_index(learner_id_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create learner_id index on grades collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on grades.learner_id");

        // Compound index on (learner_id, class_id) for per-learner-per-class lookups
        let learner_class_index = IndexModel::builder()
            .keys(doc! { "learner_id": 1, "class_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("learner_class_lookup".to_string())
                    .build(),
            )
            .build();

        grades
            .create_index(learner_class_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create learner_class index on grades collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on grades.(learner_id, class_id)");

        Ok(())
    }

    /// Installs the JSON-schema validator on the grades collection with
    /// warn-only enforcement: non-conforming writes are logged by the server
    /// but never rejected.
    pub async fn install_validator(&self) -> Result<(), AppError> {
        // collMod requires the collection to exist; creating it is a no-op
        // error when it already does.
        if let Err(e) = self.db.create_collection(GRADES_COLLECTION, None).await {
            tracing::debug!(error = %e, "Grades collection already exists");
        }

        self.db
            .run_command(
                doc! {
                    "collMod": GRADES_COLLECTION,
                    "validator": {
                        "$jsonSchema": {
                            "bsonType": "object",
                            "required": ["class_id", "learner_id"],
                            "properties": {
                                "class_id": {
                                    "bsonType": "int",
                                    "minimum": 0,
                                    "maximum": 300,
                                    "description": "'class_id' must be an integer in [0, 300]"
                                },
                                "learner_id": {
                                    "bsonType": "int",
                                    "minimum": 0,
                                    "description": "'learner_id' must be an integer greater than or equal to 0"
                                }
                            }
                        }
                    },
                    "validationLevel": "strict",
                    "validationAction": "warn",
                },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to install validator on grades collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Installed warn-mode schema validator on grades collection");

        Ok(())
    }

    /// Runs the stats pipeline, optionally restricted to one class.
    ///
    /// When nothing matches, the `$group` stages emit no output document and
    /// the result is an empty vector, so the `$divide` in the projection can
    /// never see a zero denominator.
    pub async fn class_stats(&self, class_id: Option<i32>) -> Result<Vec<ClassStats>, AppError> {
        let pipeline = stats_pipeline(class_id);

        let mut cursor = self
            .grades()
            .aggregate(pipeline, None)
            .await
            .map_err(AppError::from)?;

        let mut results = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(AppError::from)? {
            let stats: ClassStats = mongodb::bson::from_document(doc).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!(
                    "Failed to deserialize stats result: {}",
                    e
                ))
            })?;
            results.push(stats);
        }

        Ok(results)
    }

    /// First `DEBUG_SAMPLE_LIMIT` documents in natural order, unmodified.
    ///
    /// Reads raw documents rather than the typed collection: the validator
    /// is warn-only and writers are external, so documents that do not fit
    /// `GradeRecord` can exist and must still come back verbatim.
    pub async fn debug_sample(&self) -> Result<Vec<Document>, AppError> {
        let find_options = FindOptions::builder().limit(DEBUG_SAMPLE_LIMIT).build();

        let mut cursor = self
            .db
            .collection::<Document>(GRADES_COLLECTION)
            .find(None, find_options)
            .await
            .map_err(AppError::from)?;

        let mut records = Vec::new();
        while let Some(record) = cursor.try_next().await.map_err(AppError::from)? {
            records.push(record);
        }

        Ok(records)
    }

    pub async fn insert_grade(&self, record: &GradeRecord) -> Result<(), AppError> {
        self.grades()
            .insert_one(record, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert grade record: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn grades(&self) -> Collection<GradeRecord> {
        self.db.collection(GRADES_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Builds the stats aggregation pipeline.
///
/// Stage order: optional class filter, unwind the scores array, per-record
/// mean, then a single group that counts records whose mean is strictly
/// above 50 alongside the total, and a projection that derives the
/// percentage.
fn stats_pipeline(class_id: Option<i32>) -> Vec<Document> {
    let mut pipeline = Vec::new();

    if let Some(id) = class_id {
        pipeline.push(doc! { "$match": { "class_id": id } });
    }

    pipeline.push(doc! { "$unwind": { "path": "$scores" } });
    pipeline.push(doc! {
        "$group": {
            "_id": "$_id",
            "avg": { "$avg": "$scores.score" },
        }
    });
    pipeline.push(doc! {
        "$group": {
            "_id": null,
            "avgAbove50": {
                "$sum": { "$cond": [{ "$gt": ["$avg", 50] }, 1, 0] }
            },
            "totalLearners": { "$sum": 1 },
        }
    });
    pipeline.push(doc! {
        "$project": {
            "_id": 0,
            "avgAbove50": 1,
            "totalLearners": 1,
            "percentageAbove50": {
                "$multiply": [
                    { "$divide": ["$avgAbove50", "$totalLearners"] },
                    100
                ]
            },
        }
    });

    pipeline
}
