use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{ParticipantesDoc, PartidosDoc, Torneo};
use crate::shared::AppError;

const TORNEOS_FILE: &str = "torneos.json";

/// Storage abstraction for all persisted documents: the tournament list,
/// the per-tournament participants/matches documents and uploaded covers.
///
/// Missing files surface as `AppError::NotFound`; documents that parse but
/// do not match the expected shape surface as `AppError::Structure`, which
/// is a data-integrity condition rather than a client error.
#[async_trait]
pub trait RecordStore {
    async fn read_tournaments(&self) -> Result<Vec<Torneo>, AppError>;
    async fn write_tournaments(&self, torneos: &[Torneo]) -> Result<(), AppError>;

    async fn read_participants(&self, torneo_id: &str) -> Result<ParticipantesDoc, AppError>;
    async fn write_participants(
        &self,
        torneo_id: &str,
        doc: &ParticipantesDoc,
    ) -> Result<(), AppError>;

    async fn read_matches(&self, torneo_id: &str) -> Result<PartidosDoc, AppError>;
    async fn write_matches(&self, torneo_id: &str, doc: &PartidosDoc) -> Result<(), AppError>;

    async fn save_cover_image(
        &self,
        torneo_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), AppError>;
    async fn read_cover_image(&self, torneo_id: &str, file_name: &str)
        -> Result<Vec<u8>, AppError>;

    /// Removes every document belonging to a tournament (cascade delete).
    async fn delete_tournament_data(&self, torneo_id: &str) -> Result<(), AppError>;
}

/// Filesystem-backed implementation. Layout:
///
/// ```text
/// <data_dir>/torneos.json
/// <data_dir>/<torneo_id>/participantes-<torneo_id>.json
/// <data_dir>/<torneo_id>/partidos-<torneo_id>.json
/// <data_dir>/<torneo_id>/<cover image>
/// ```
///
/// The per-tournament directory is created lazily on first write. Documents
/// are written pretty-printed to a temporary file and renamed into place;
/// a crash between the two steps leaves the previous version intact, but
/// there is no transaction spanning multiple documents.
pub struct FsRecordStore {
    data_dir: PathBuf,
}

impl FsRecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn tournament_dir(&self, torneo_id: &str) -> PathBuf {
        self.data_dir.join(torneo_id)
    }

    fn participants_path(&self, torneo_id: &str) -> PathBuf {
        self.tournament_dir(torneo_id)
            .join(format!("participantes-{torneo_id}.json"))
    }

    fn matches_path(&self, torneo_id: &str) -> PathBuf {
        self.tournament_dir(torneo_id)
            .join(format!("partidos-{torneo_id}.json"))
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path, what: &str) -> Result<T, AppError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document not on disk");
                return Err(AppError::NotFound(format!("{what} no encontrado")));
            }
            Err(err) => return Err(AppError::Io(err)),
        };

        serde_json::from_str(&raw).map_err(|err| {
            warn!(path = %path.display(), error = %err, "stored document does not parse");
            AppError::Structure(format!("{what}: {err}"))
        })
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let serialized =
            serde_json::to_string_pretty(value).map_err(|err| AppError::Structure(err.to_string()))?;

        // Write-then-rename so a crash mid-write never truncates the
        // previous version of the document.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serialized).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    #[instrument(skip(self))]
    async fn read_tournaments(&self) -> Result<Vec<Torneo>, AppError> {
        self.read_json(&self.data_dir.join(TORNEOS_FILE), "Archivo de torneos")
            .await
    }

    #[instrument(skip(self, torneos))]
    async fn write_tournaments(&self, torneos: &[Torneo]) -> Result<(), AppError> {
        debug!(count = torneos.len(), "writing tournament list");
        self.write_json(&self.data_dir.join(TORNEOS_FILE), &torneos)
            .await
    }

    #[instrument(skip(self))]
    async fn read_participants(&self, torneo_id: &str) -> Result<ParticipantesDoc, AppError> {
        self.read_json(&self.participants_path(torneo_id), "Recurso participantes")
            .await
    }

    #[instrument(skip(self, doc))]
    async fn write_participants(
        &self,
        torneo_id: &str,
        doc: &ParticipantesDoc,
    ) -> Result<(), AppError> {
        debug!(count = doc.participantes.len(), "writing participants document");
        self.write_json(&self.participants_path(torneo_id), doc).await
    }

    #[instrument(skip(self))]
    async fn read_matches(&self, torneo_id: &str) -> Result<PartidosDoc, AppError> {
        self.read_json(&self.matches_path(torneo_id), "Recurso partidos")
            .await
    }

    #[instrument(skip(self, doc))]
    async fn write_matches(&self, torneo_id: &str, doc: &PartidosDoc) -> Result<(), AppError> {
        debug!(count = doc.partidos.len(), "writing matches document");
        self.write_json(&self.matches_path(torneo_id), doc).await
    }

    #[instrument(skip(self, bytes))]
    async fn save_cover_image(
        &self,
        torneo_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), AppError> {
        let dir = self.tournament_dir(torneo_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read_cover_image(
        &self,
        torneo_id: &str,
        file_name: &str,
    ) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(self.tournament_dir(torneo_id).join(file_name)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("Imagen no encontrada".to_string()))
            }
            Err(err) => Err(AppError::Io(err)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_tournament_data(&self, torneo_id: &str) -> Result<(), AppError> {
        match tokio::fs::remove_dir_all(self.tournament_dir(torneo_id)).await {
            Ok(()) => Ok(()),
            // A tournament with no participants, matches or cover never got
            // its directory; nothing to clean up.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Io(err)),
        }
    }
}

/// In-memory implementation of RecordStore for development and testing
#[derive(Default)]
pub struct InMemoryRecordStore {
    tournaments: RwLock<Option<Vec<Torneo>>>,
    participants: RwLock<HashMap<String, ParticipantesDoc>>,
    matches: RwLock<HashMap<String, PartidosDoc>>,
    covers: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read_tournaments(&self) -> Result<Vec<Torneo>, AppError> {
        self.tournaments
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::NotFound("Archivo de torneos no encontrado".to_string()))
    }

    async fn write_tournaments(&self, torneos: &[Torneo]) -> Result<(), AppError> {
        *self.tournaments.write().await = Some(torneos.to_vec());
        Ok(())
    }

    async fn read_participants(&self, torneo_id: &str) -> Result<ParticipantesDoc, AppError> {
        self.participants
            .read()
            .await
            .get(torneo_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Recurso participantes no encontrado".to_string()))
    }

    async fn write_participants(
        &self,
        torneo_id: &str,
        doc: &ParticipantesDoc,
    ) -> Result<(), AppError> {
        self.participants
            .write()
            .await
            .insert(torneo_id.to_string(), doc.clone());
        Ok(())
    }

    async fn read_matches(&self, torneo_id: &str) -> Result<PartidosDoc, AppError> {
        self.matches
            .read()
            .await
            .get(torneo_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Recurso partidos no encontrado".to_string()))
    }

    async fn write_matches(&self, torneo_id: &str, doc: &PartidosDoc) -> Result<(), AppError> {
        self.matches
            .write()
            .await
            .insert(torneo_id.to_string(), doc.clone());
        Ok(())
    }

    async fn save_cover_image(
        &self,
        torneo_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), AppError> {
        self.covers.write().await.insert(
            (torneo_id.to_string(), file_name.to_string()),
            bytes.to_vec(),
        );
        Ok(())
    }

    async fn read_cover_image(
        &self,
        torneo_id: &str,
        file_name: &str,
    ) -> Result<Vec<u8>, AppError> {
        self.covers
            .read()
            .await
            .get(&(torneo_id.to_string(), file_name.to_string()))
            .cloned()
            .ok_or_else(|| AppError::NotFound("Imagen no encontrada".to_string()))
    }

    async fn delete_tournament_data(&self, torneo_id: &str) -> Result<(), AppError> {
        self.participants.write().await.remove(torneo_id);
        self.matches.write().await.remove(torneo_id);
        self.covers
            .write()
            .await
            .retain(|(id, _), _| id != torneo_id);
        Ok(())
    }
}
