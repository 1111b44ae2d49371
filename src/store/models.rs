use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Disciplines offered in the catalog. The serialized values are the wire
/// format consumed by the frontend and stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Disciplina {
    #[serde(rename = "futbol")]
    #[strum(serialize = "futbol")]
    Futbol,
    #[serde(rename = "counter_strike_2")]
    #[strum(serialize = "counter_strike_2")]
    CounterStrike2,
    #[serde(rename = "volley")]
    #[strum(serialize = "volley")]
    Volley,
    #[serde(rename = "league_of_legends")]
    #[strum(serialize = "league_of_legends")]
    LeagueOfLegends,
    #[serde(rename = "basket")]
    #[strum(serialize = "basket")]
    Basket,
}

/// Tournament lifecycle state, stored as a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EstadoTorneo {
    SinComenzar,
    EnCurso,
    Finalizado,
}

impl From<EstadoTorneo> for u8 {
    fn from(estado: EstadoTorneo) -> u8 {
        match estado {
            EstadoTorneo::SinComenzar => 0,
            EstadoTorneo::EnCurso => 1,
            EstadoTorneo::Finalizado => 2,
        }
    }
}

impl TryFrom<u8> for EstadoTorneo {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EstadoTorneo::SinComenzar),
            1 => Ok(EstadoTorneo::EnCurso),
            2 => Ok(EstadoTorneo::Finalizado),
            other => Err(format!("estado desconocido: {other}")),
        }
    }
}

/// Persistent tournament record. This is the on-disk shape; API responses go
/// through `tournament::types::TorneoResponse`, which drops the key hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torneo {
    pub torneo_id: String,
    pub nombre: String,
    pub disciplina: Disciplina,
    pub formato: String,
    pub estado: EstadoTorneo,
    pub nro_participantes: u32,
    pub organizador: String,
    pub premio: String,
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "portadaURL", default)]
    pub portada_url: Option<String>,
    pub admin_key_hashed: String,
    pub creado_en: DateTime<Utc>,
}

/// Enrolled competitor. The five statistics fields are derived: only the
/// standings engine writes them, always from the full match history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participante {
    pub id: String,
    pub nombre: String,
    pub participante_key_hashed: String,
    pub creado_en: DateTime<Utc>,
    #[serde(default)]
    pub partidos_jugados: u32,
    #[serde(default)]
    pub ganados: u32,
    #[serde(default)]
    pub empatados: u32,
    #[serde(default)]
    pub perdidos: u32,
    #[serde(default)]
    pub puntos: u32,
}

impl Participante {
    pub fn reset_estadisticas(&mut self) {
        self.partidos_jugados = 0;
        self.ganados = 0;
        self.empatados = 0;
        self.perdidos = 0;
        self.puntos = 0;
    }
}

/// Per-tournament participants document, `participantes-<id>.json` on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantesDoc {
    pub torneo_id: String,
    pub participantes: Vec<Participante>,
}

impl ParticipantesDoc {
    pub fn new(torneo_id: impl Into<String>) -> Self {
        Self {
            torneo_id: torneo_id.into(),
            participantes: Vec::new(),
        }
    }

    pub fn siguiente_id(&self) -> String {
        next_sequential_id(self.participantes.iter().map(|p| p.id.as_str()))
    }
}

/// A fixture between two participants. Both results present means played;
/// both absent means scheduled but not yet played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partido {
    pub partido_id: String,
    pub participante1_id: String,
    pub participante2_id: String,
    pub fecha: String,
    #[serde(default)]
    pub jugado_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultado1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultado2: Option<u32>,
}

impl Partido {
    /// True when the fixture has been played (both results recorded).
    pub fn jugado(&self) -> bool {
        self.resultado1.is_some() && self.resultado2.is_some()
    }
}

/// Per-tournament matches document, `partidos-<id>.json` on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartidosDoc {
    pub torneo_id: String,
    pub partidos: Vec<Partido>,
}

impl PartidosDoc {
    pub fn new(torneo_id: impl Into<String>) -> Self {
        Self {
            torneo_id: torneo_id.into(),
            partidos: Vec::new(),
        }
    }

    pub fn siguiente_id(&self) -> String {
        next_sequential_id(self.partidos.iter().map(|p| p.partido_id.as_str()))
    }
}

/// Sequential id policy: `max(numeric ids) + 1`, zero-padded to four digits,
/// `"0001"` as the base case. Non-numeric ids are ignored by the scan, so a
/// sparse or hand-edited list never reuses an id that still parses.
pub(crate) fn next_sequential_id<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids.filter_map(|id| id.parse::<u32>().ok()).max().unwrap_or(0);
    format!("{:04}", max + 1)
}
