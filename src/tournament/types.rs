use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::shared::AppError;
use crate::store::models::{Disciplina, EstadoTorneo, Torneo};

/// Public view of a tournament: every stored field except the admin key
/// hash, which must never appear in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorneoResponse {
    pub torneo_id: String,
    pub nombre: String,
    pub disciplina: Disciplina,
    pub formato: String,
    pub estado: EstadoTorneo,
    pub nro_participantes: u32,
    pub organizador: String,
    pub premio: String,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub descripcion: String,
    pub tags: Vec<String>,
    #[serde(rename = "portadaURL")]
    pub portada_url: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl From<&Torneo> for TorneoResponse {
    fn from(torneo: &Torneo) -> Self {
        Self {
            torneo_id: torneo.torneo_id.clone(),
            nombre: torneo.nombre.clone(),
            disciplina: torneo.disciplina,
            formato: torneo.formato.clone(),
            estado: torneo.estado,
            nro_participantes: torneo.nro_participantes,
            organizador: torneo.organizador.clone(),
            premio: torneo.premio.clone(),
            fecha_inicio: torneo.fecha_inicio.clone(),
            fecha_fin: torneo.fecha_fin.clone(),
            descripcion: torneo.descripcion.clone(),
            tags: torneo.tags.clone(),
            portada_url: torneo.portada_url.clone(),
            creado_en: torneo.creado_en,
        }
    }
}

/// Response for tournament creation. The admin key is shown here exactly
/// once; only its hash is stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct CrearTorneoResponse {
    pub torneo_id: String,
    pub admin_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthAdminResponse {
    pub valid: bool,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MensajeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortadaResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginacion {
    pub index: u32,
    pub limite: u32,
    pub total_torneos: u32,
    pub total_paginas: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TorneosPaginados {
    pub data: Vec<TorneoResponse>,
    pub paginacion: Paginacion,
}

/// Validated payload for tournament creation. Parsed by hand from the raw
/// JSON body so every malformed field gets its own message instead of a
/// single opaque deserialization error.
#[derive(Debug)]
pub struct CrearTorneoRequest {
    pub nombre: String,
    pub disciplina: Disciplina,
    pub formato: String,
    pub estado: EstadoTorneo,
    pub nro_participantes: u32,
    pub organizador: String,
    pub premio: String,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub descripcion: String,
    pub tags: Vec<String>,
}

impl CrearTorneoRequest {
    pub fn parse(body: &Value) -> Result<Self, AppError> {
        let mut errores = Vec::new();

        let nombre = campo_string(body, "nombre", &mut errores);
        let formato = campo_string(body, "formato", &mut errores);
        let organizador = campo_string(body, "organizador", &mut errores);
        let disciplina = campo_disciplina(body, &mut errores);
        let estado = campo_estado(body, &mut errores);
        let nro_participantes = campo_capacidad(body, &mut errores);
        let tags = campo_tags(body, &mut errores);

        if !errores.is_empty() {
            return Err(AppError::Validation(errores));
        }

        Ok(Self {
            nombre: nombre.unwrap(),
            disciplina: disciplina.unwrap(),
            formato: formato.unwrap(),
            estado: estado.unwrap(),
            nro_participantes: nro_participantes.unwrap(),
            organizador: organizador.unwrap(),
            premio: campo_string_o(body, "premio").unwrap_or_else(|| "Por definir".to_string()),
            fecha_inicio: campo_string_o(body, "fecha_inicio"),
            fecha_fin: campo_string_o(body, "fecha_fin"),
            descripcion: campo_string_o(body, "descripcion").unwrap_or_default(),
            tags,
        })
    }
}

/// Validated payload for a partial tournament update. Only the provided
/// fields are touched; ids, the key hash, the cover path and the creation
/// timestamp are immutable through this endpoint.
#[derive(Debug, Default)]
pub struct ActualizarTorneoRequest {
    pub nombre: Option<String>,
    pub disciplina: Option<Disciplina>,
    pub formato: Option<String>,
    pub estado: Option<EstadoTorneo>,
    pub nro_participantes: Option<u32>,
    pub organizador: Option<String>,
    pub premio: Option<String>,
    // Tri-state: absent = keep, null = clear, string = replace.
    pub fecha_inicio: Option<Option<String>>,
    pub fecha_fin: Option<Option<String>>,
    pub descripcion: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ActualizarTorneoRequest {
    pub fn parse(body: &Value) -> Result<Self, AppError> {
        let mut errores = Vec::new();
        let mut req = Self::default();

        if body.get("nombre").is_some() {
            req.nombre = campo_string(body, "nombre", &mut errores);
        }
        if body.get("formato").is_some() {
            req.formato = campo_string(body, "formato", &mut errores);
        }
        if body.get("organizador").is_some() {
            req.organizador = campo_string(body, "organizador", &mut errores);
        }
        if body.get("disciplina").is_some() {
            req.disciplina = campo_disciplina(body, &mut errores);
        }
        if body.get("estado").is_some() {
            req.estado = campo_estado(body, &mut errores);
        }
        if body.get("nro_participantes").is_some() {
            req.nro_participantes = campo_capacidad(body, &mut errores);
        }
        if body.get("premio").is_some() {
            req.premio = campo_string_o(body, "premio");
        }
        if body.get("descripcion").is_some() {
            req.descripcion = campo_string_o(body, "descripcion");
        }
        if let Some(valor) = body.get("fecha_inicio") {
            req.fecha_inicio = Some(valor.as_str().map(str::to_string));
        }
        if let Some(valor) = body.get("fecha_fin") {
            req.fecha_fin = Some(valor.as_str().map(str::to_string));
        }
        if body.get("tags").is_some() {
            req.tags = Some(campo_tags(body, &mut errores));
        }

        if !errores.is_empty() {
            return Err(AppError::Validation(errores));
        }
        Ok(req)
    }

    pub fn apply(self, torneo: &mut Torneo) {
        if let Some(nombre) = self.nombre {
            torneo.nombre = nombre;
        }
        if let Some(disciplina) = self.disciplina {
            torneo.disciplina = disciplina;
        }
        if let Some(formato) = self.formato {
            torneo.formato = formato;
        }
        if let Some(estado) = self.estado {
            torneo.estado = estado;
        }
        if let Some(nro) = self.nro_participantes {
            torneo.nro_participantes = nro;
        }
        if let Some(organizador) = self.organizador {
            torneo.organizador = organizador;
        }
        if let Some(premio) = self.premio {
            torneo.premio = premio;
        }
        if let Some(descripcion) = self.descripcion {
            torneo.descripcion = descripcion;
        }
        if let Some(fecha_inicio) = self.fecha_inicio {
            torneo.fecha_inicio = fecha_inicio;
        }
        if let Some(fecha_fin) = self.fecha_fin {
            torneo.fecha_fin = fecha_fin;
        }
        if let Some(tags) = self.tags {
            torneo.tags = tags;
        }
    }
}

fn campo_string(body: &Value, campo: &str, errores: &mut Vec<String>) -> Option<String> {
    match body.get(campo).and_then(Value::as_str) {
        Some(valor) if !valor.trim().is_empty() => Some(valor.to_string()),
        _ => {
            errores.push(format!("El campo '{campo}' es obligatorio"));
            None
        }
    }
}

fn campo_string_o(body: &Value, campo: &str) -> Option<String> {
    body.get(campo)
        .and_then(Value::as_str)
        .filter(|valor| !valor.is_empty())
        .map(str::to_string)
}

fn campo_disciplina(body: &Value, errores: &mut Vec<String>) -> Option<Disciplina> {
    match body
        .get("disciplina")
        .and_then(Value::as_str)
        .map(Disciplina::from_str)
    {
        Some(Ok(disciplina)) => Some(disciplina),
        _ => {
            errores.push(
                "El campo 'disciplina' debe ser una de: futbol, counter_strike_2, volley, \
                 league_of_legends, basket"
                    .to_string(),
            );
            None
        }
    }
}

fn campo_estado(body: &Value, errores: &mut Vec<String>) -> Option<EstadoTorneo> {
    match body
        .get("estado")
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())
        .map(EstadoTorneo::try_from)
    {
        Some(Ok(estado)) => Some(estado),
        _ => {
            errores.push("El campo 'estado' debe ser 0, 1 o 2".to_string());
            None
        }
    }
}

fn campo_capacidad(body: &Value, errores: &mut Vec<String>) -> Option<u32> {
    match body.get("nro_participantes").and_then(Value::as_u64) {
        Some(n) if n >= 1 && n <= u32::MAX as u64 => Some(n as u32),
        _ => {
            errores
                .push("El campo 'nro_participantes' debe ser un entero mayor que cero".to_string());
            None
        }
    }
}

fn campo_tags(body: &Value, errores: &mut Vec<String>) -> Vec<String> {
    match body.get("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(valores)) => valores
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => {
            errores.push("El campo 'tags' debe ser una lista de textos".to_string());
            Vec::new()
        }
    }
}
