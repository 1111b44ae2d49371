use serde_json::Value;

use crate::shared::AppError;

/// Validated payload for match creation. The result is all-or-nothing: a
/// fixture is either scheduled (no result) or played (both scores).
#[derive(Debug)]
pub struct CrearPartidoRequest {
    pub participante1_id: String,
    pub participante2_id: String,
    pub fecha: String,
    pub jugado_en: String,
    pub resultado: Option<(u32, u32)>,
}

impl CrearPartidoRequest {
    pub fn parse(body: &Value) -> Result<Self, AppError> {
        let mut errores = Vec::new();

        let participante1_id = campo_string(body, "participante1_id", &mut errores);
        let participante2_id = campo_string(body, "participante2_id", &mut errores);
        let fecha = campo_string(body, "fecha", &mut errores);
        let resultado = campo_resultado(body, &mut errores);

        if let (Some(p1), Some(p2)) = (&participante1_id, &participante2_id) {
            if p1 == p2 {
                errores.push("Los participantes deben ser diferentes".to_string());
            }
        }

        if !errores.is_empty() {
            return Err(AppError::Validation(errores));
        }

        Ok(Self {
            participante1_id: participante1_id.unwrap(),
            participante2_id: participante2_id.unwrap(),
            fecha: fecha.unwrap(),
            jugado_en: campo_string_o(body, "jugado_en"),
            resultado,
        })
    }
}

/// Validated payload for a match update. Only the result and the venue are
/// editable; the fixture's participants and date are immutable.
#[derive(Debug, Default)]
pub struct ActualizarPartidoRequest {
    pub jugado_en: Option<String>,
    pub resultado: Option<(u32, u32)>,
}

impl ActualizarPartidoRequest {
    pub fn parse(body: &Value) -> Result<Self, AppError> {
        let mut errores = Vec::new();
        let resultado = campo_resultado(body, &mut errores);

        if !errores.is_empty() {
            return Err(AppError::Validation(errores));
        }

        let jugado_en = body
            .get("jugado_en")
            .and_then(Value::as_str)
            .map(str::to_string);

        if jugado_en.is_none() && resultado.is_none() {
            return Err(AppError::validation(
                "No hay campos para actualizar: se aceptan 'resultado1', 'resultado2' y 'jugado_en'",
            ));
        }

        Ok(Self {
            jugado_en,
            resultado,
        })
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

fn campo_string_o(body: &Value, campo: &str) -> String {
    body.get(campo)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parses `resultado1`/`resultado2`. Absent or null means unplayed; when
/// present, both must be present and be non-negative integers.
fn campo_resultado(body: &Value, errores: &mut Vec<String>) -> Option<(u32, u32)> {
    let leer = |campo: &str| -> Option<&Value> {
        body.get(campo).filter(|valor| !valor.is_null())
    };

    match (leer("resultado1"), leer("resultado2")) {
        (None, None) => None,
        (Some(r1), Some(r2)) => {
            let mut parsear = |campo: &str, valor: &Value| -> Option<u32> {
                match valor.as_u64().and_then(|n| u32::try_from(n).ok()) {
                    Some(n) => Some(n),
                    None => {
                        errores.push(format!(
                            "El campo '{campo}' debe ser un entero no negativo"
                        ));
                        None
                    }
                }
            };
            match (parsear("resultado1", r1), parsear("resultado2", r2)) {
                (Some(r1), Some(r2)) => Some((r1, r2)),
                _ => None,
            }
        }
        _ => {
            errores.push(
                "Los resultados deben indicarse ambos o ninguno ('resultado1' y 'resultado2')"
                    .to_string(),
            );
            None
        }
    }
}
