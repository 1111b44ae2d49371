use std::cmp::Ordering;
use tracing::warn;

use crate::store::models::{Participante, Partido};

pub const PUNTOS_VICTORIA: u32 = 3;
pub const PUNTOS_EMPATE: u32 = 1;

/// Rebuilds every participant's derived statistics from the full match list.
///
/// The five fields are zeroed first and then every played match is applied,
/// so the result depends only on the match set: re-running on the same
/// input always yields the same statistics, and edits or deletions never
/// leave stale increments behind. Matches without results contribute
/// nothing. A match referencing an id that is no longer enrolled is skipped
/// with a warning (data-integrity notice, not a fatal error).
pub fn recompute(participantes: &mut [Participante], partidos: &[Partido]) {
    for participante in participantes.iter_mut() {
        participante.reset_estadisticas();
    }

    for partido in partidos {
        let (Some(resultado1), Some(resultado2)) = (partido.resultado1, partido.resultado2) else {
            continue;
        };

        let idx1 = participantes
            .iter()
            .position(|p| p.id == partido.participante1_id);
        let idx2 = participantes
            .iter()
            .position(|p| p.id == partido.participante2_id);

        let (Some(idx1), Some(idx2)) = (idx1, idx2) else {
            warn!(
                partido_id = %partido.partido_id,
                participante1_id = %partido.participante1_id,
                participante2_id = %partido.participante2_id,
                "partido huérfano: participante dado de baja, se omite del cómputo"
            );
            continue;
        };

        if idx1 == idx2 {
            warn!(partido_id = %partido.partido_id, "partido contra sí mismo, se omite");
            continue;
        }

        participantes[idx1].partidos_jugados += 1;
        participantes[idx2].partidos_jugados += 1;

        match resultado1.cmp(&resultado2) {
            Ordering::Greater => {
                participantes[idx1].ganados += 1;
                participantes[idx1].puntos += PUNTOS_VICTORIA;
                participantes[idx2].perdidos += 1;
            }
            Ordering::Less => {
                participantes[idx2].ganados += 1;
                participantes[idx2].puntos += PUNTOS_VICTORIA;
                participantes[idx1].perdidos += 1;
            }
            Ordering::Equal => {
                participantes[idx1].empatados += 1;
                participantes[idx1].puntos += PUNTOS_EMPATE;
                participantes[idx2].empatados += 1;
                participantes[idx2].puntos += PUNTOS_EMPATE;
            }
        }
    }
}
