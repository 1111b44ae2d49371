use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::models::{Participante, ParticipantesDoc};

/// Public view of a participant: statistics included, key hash excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipanteResponse {
    pub id: String,
    pub nombre: String,
    pub creado_en: DateTime<Utc>,
    pub partidos_jugados: u32,
    pub ganados: u32,
    pub empatados: u32,
    pub perdidos: u32,
    pub puntos: u32,
}

impl From<&Participante> for ParticipanteResponse {
    fn from(participante: &Participante) -> Self {
        Self {
            id: participante.id.clone(),
            nombre: participante.nombre.clone(),
            creado_en: participante.creado_en,
            partidos_jugados: participante.partidos_jugados,
            ganados: participante.ganados,
            empatados: participante.empatados,
            perdidos: participante.perdidos,
            puntos: participante.puntos,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantesResponse {
    pub torneo_id: String,
    pub participantes: Vec<ParticipanteResponse>,
}

impl From<&ParticipantesDoc> for ParticipantesResponse {
    fn from(doc: &ParticipantesDoc) -> Self {
        Self {
            torneo_id: doc.torneo_id.clone(),
            participantes: doc.participantes.iter().map(Into::into).collect(),
        }
    }
}

/// Response for enrollment. The participant key is shown here exactly once;
/// only its hash is stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct InscripcionResponse {
    pub participante_id: String,
    pub nombre: String,
    pub participante_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthParticipanteResponse {
    pub valid: bool,
    pub participante_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_never_contains_participant_key_hash() {
        let participante = Participante {
            id: "0001".to_string(),
            nombre: "Alice".to_string(),
            participante_key_hashed: "$2b$12$super-secreto".to_string(),
            creado_en: Utc::now(),
            partidos_jugados: 1,
            ganados: 1,
            empatados: 0,
            perdidos: 0,
            puntos: 3,
        };

        let json = serde_json::to_string(&ParticipanteResponse::from(&participante)).unwrap();
        assert!(!json.contains("participante_key"));
        assert!(!json.contains("super-secreto"));
        assert!(json.contains("\"puntos\":3"));
    }
}
