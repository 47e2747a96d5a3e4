//! State resolution
//!
//! State courts and state prosecutors' offices carry their state in the organ
//! id. The four federal branches do not, so their members' state is read from
//! the free-text workplace (lotação) field. Every miss resolves to "DF".

use once_cell::sync::Lazy;
use regex::Regex;

use super::orgao::{estado_from_id, is_federal};

/// Default state for federal members whose workplace cannot be placed
pub const DEFAULT_ESTADO: &str = "DF";

/// Labor-court (TRT) region → headquarters state, for MPT workplaces
const TRT_REGIAO_ESTADO: &[(&str, &str)] = &[
    ("1", "RJ"), ("2", "SP"), ("3", "MG"), ("4", "RS"), ("5", "BA"), ("6", "PE"),
    ("7", "CE"), ("8", "PA"), ("9", "PR"), ("10", "DF"), ("11", "AM"), ("12", "SC"),
    ("13", "PB"), ("14", "RO"), ("15", "SP"), ("16", "MA"), ("17", "ES"), ("18", "GO"),
    ("19", "AL"), ("20", "SE"), ("21", "RN"), ("22", "PI"), ("23", "MT"), ("24", "MS"),
];

/// Federal regional prosecution (PRR) region → headquarters state, for MPF
const PRR_REGIAO_ESTADO: &[(&str, &str)] = &[
    ("1", "DF"), ("2", "RJ"), ("3", "SP"), ("4", "RS"), ("5", "PE"), ("6", "MG"),
];

/// Municipal prosecution office (PRM) city, as spelled upstream → state
const PRM_CIDADE_ESTADO: &[(&str, &str)] = &[
    ("ALAGOINHAS", "BA"), ("ALTAMIRA-PA", "PA"), ("ANAPOLIS", "GO"),
    ("ANGRA REIS", "RJ"), ("ARACATUBA", "SP"), ("ARAGUAINA", "TO"),
    ("ARAPIRACA", "AL"), ("ARARAQUARA", "SP"), ("ASSIS", "SP"),
    ("B.DO GARÇAS", "MT"), ("B.GONCALVES", "RS"), ("BACABAL", "MA"),
    ("BAGÉ", "RS"), ("BARREIRAS", "BA"), ("BAURU", "SP"),
    ("BLUMENAU", "SC"), ("BRAGANÇA", "PA"), ("C. MOURAO", "PR"),
    ("C.GRANDE", "MS"), ("CACERES", "MT"), ("CAMPINAS", "SP"),
    ("CAMPOS", "RJ"), ("CARAGUATA", "SP"), ("CARUARU", "PE"),
    ("CASCAVEL", "PR"), ("CAXIAS", "MA"), ("CAXIAS SUL", "RS"),
    ("CAÇADOR", "SC"), ("CHAPECO", "SC"), ("CORRENTE", "PI"),
    ("CORUMBA", "MS"), ("CRICIUMA", "SC"), ("CRUZ ALTA", "RS"),
    ("DIVINÓPOLIS", "MG"), ("DOURADOS", "MS"), ("ERECHIM/P.M", "RS"),
    ("EUNAPOLIS", "BA"), ("F.BELTRAO", "PR"), ("FEIRA", "BA"),
    ("FLORIANO", "PI"), ("FOZ", "PR"), ("FRANCA", "SP"),
    ("GARANHUNS", "PE"), ("GOV VALADAR", "MG"), ("GUANAMBI", "BA"),
    ("GUARULHOS", "SP"), ("ILHEUS", "BA"), ("IMPERATRIZ", "MA"),
    ("IRECÊ", "BA"), ("ITAJAI", "SC"), ("ITAPERUNA", "RJ"),
    ("ITAPEVA", "SP"), ("J. NORTE", "CE"), ("JALES", "SP"),
    ("JAU", "SP"), ("JEQUIE", "BA"), ("JI PARANÁ", "RO"),
    ("JOINVILLE", "SC"), ("JUIZ FORA", "MG"), ("JUNDIAI", "SP"),
    ("LAGES", "SC"), ("LIMOEIRO", "PE"), ("LONDRINA", "PR"),
    ("LUZIANIA", "GO"), ("M. CLAROS", "MG"), ("MACAE", "RJ"),
    ("MARABA", "PA"), ("MARINGA", "PR"), ("MARÍLIA", "SP"),
    ("MOSSORO", "RN"), ("N.FRIBURGO", "RJ"), ("N.HAMBURGO", "RS"),
    ("NITEROI", "RJ"), ("OURINHOS", "SP"), ("P.FUNDO", "RS"),
    ("P.GROSSA", "PR"), ("P.PRUDENTE", "SP"), ("PARAGOMINAS", "PA"),
    ("PARNAIBA", "PI"), ("PATO BCO", "PR"), ("PELOTAS-RS", "RS"),
    ("PETROLINA", "PE"), ("PETROPOLIS", "RJ"), ("PICOS-PI", "PI"),
    ("PIRACICABA", "SP"), ("R.GRANDE", "RS"), ("R.PRETO", "SP"),
    ("REDENÇÃO", "PA"), ("RESENDE-RJ", "RJ"), ("RONDONOPOLI", "MT"),
    ("S. TALHADA", "PE"), ("S.ANGELO", "RS"), ("S.BERNARDO", "SP"),
    ("S.CARLOS", "SP"), ("S.GONÇALO", "RJ"), ("S.J. MERITI", "RJ"),
    ("S.J.CAMP", "SP"), ("S.J.DEL REI", "MG"), ("S.J.R.PRETO", "SP"),
    ("S.LIVRAMENT", "RS"), ("S.MARIA", "RS"), ("S.MIGUEL", "RN"),
    ("S.P.ALDEIA", "RJ"), ("S.R.NONATO", "PI"), ("SANTA ROSA", "RS"),
    ("SANTAREM", "PA"), ("SANTOS", "SP"), ("SETE LAGOAS", "MG"),
    ("SINOP", "MT"), ("SOBRAL", "CE"), ("SOROCABA", "SP"),
    ("SOUSA", "PB"), ("STA CRUZ SU", "RS"), ("TABATINGA", "AM"),
    ("TAUBATE", "SP"), ("TEFÉ", "AM"), ("TRES LAGOAS", "MS"),
    ("TUBARAO", "SC"), ("TUCURUI", "PA"), ("UBERABA", "MG"),
    ("UBERLANDIA", "MG"), ("UMUARAMA", "PR"), ("URUGUAIANA", "RS"),
    ("V.REDONDA", "RJ"), ("VARGINHA", "MG"), ("VIT. CONQUI", "BA"),
];

static MPF_PR_ESTADO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PR-([A-Z]{2})$").expect("Invalid PR regex"));
static MPF_PRR_REGIAO: Lazy<Regex> = Lazy::new(|| Regex::new(r"PRR(\d)").expect("Invalid PRR regex"));
static MPF_PRM_CIDADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PRM-(.+)$").expect("Invalid PRM regex"));
static MPT_REGIAO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)[ªº]\s*REGI").expect("Invalid TRT regex"));
static MPM_UF_SUFIXO: Lazy<Regex> = Lazy::new(|| Regex::new(r"/([A-Z]{2})\s*$").expect("Invalid UF regex"));

/// Resolved state and whether it came from the "DF" fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstadoResolution {
    pub estado: String,
    /// True when a federal workplace could not be placed and "DF" was used
    pub fallback: bool,
}

impl EstadoResolution {
    fn found(estado: impl Into<String>) -> Self {
        Self {
            estado: estado.into(),
            fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            estado: DEFAULT_ESTADO.to_string(),
            fallback: true,
        }
    }
}

/// Resolve a member's state from the organ id and, for federal branches,
/// the workplace field
pub fn resolve_estado(orgao_id: &str, lotacao: &str) -> EstadoResolution {
    if !is_federal(orgao_id) {
        return EstadoResolution::found(estado_from_id(orgao_id));
    }
    resolve_federal(orgao_id, lotacao)
}

fn resolve_federal(orgao_id: &str, lotacao: &str) -> EstadoResolution {
    if orgao_id == "mpdft" {
        return EstadoResolution::found(DEFAULT_ESTADO);
    }

    let lot = lotacao.trim().to_uppercase();
    if lot.is_empty() {
        return EstadoResolution::fallback();
    }

    let resolved = match orgao_id {
        "mpf" => resolve_mpf(&lot),
        "mpt" => capture(&MPT_REGIAO, &lot).and_then(|regiao| lookup(TRT_REGIAO_ESTADO, &regiao)),
        "mpm" => capture(&MPM_UF_SUFIXO, &lot),
        _ => None,
    };

    resolved.map(EstadoResolution::found).unwrap_or_else(EstadoResolution::fallback)
}

fn resolve_mpf(lot: &str) -> Option<String> {
    if let Some(uf) = capture(&MPF_PR_ESTADO, lot) {
        return Some(uf);
    }
    if let Some(regiao) = capture(&MPF_PRR_REGIAO, lot) {
        return lookup(PRR_REGIAO_ESTADO, &regiao);
    }
    if let Some(cidade) = capture(&MPF_PRM_CIDADE, lot) {
        return lookup(PRM_CIDADE_ESTADO, &cidade);
    }
    // PGR, GABPGR, ESMPU and other central units sit in Brasília
    None
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, estado)| (*estado).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estado(orgao: &str, lotacao: &str) -> String {
        resolve_estado(orgao, lotacao).estado
    }

    #[test]
    fn test_state_organs_use_id_suffix() {
        assert_eq!(estado("tjsp", "qualquer"), "SP");
        assert_eq!(estado("tjdft", ""), "DF");
        assert_eq!(estado("mpba", ""), "BA");
        assert!(!resolve_estado("tjrs", "").fallback);
    }

    #[test]
    fn test_mpf_workplaces() {
        assert_eq!(estado("mpf", "PR-SP"), "SP");
        assert_eq!(estado("mpf", " pr-rj "), "RJ");
        assert_eq!(estado("mpf", "PRR4ª REGIÃO"), "RS");
        assert_eq!(estado("mpf", "PRM-CAMPINAS"), "SP");
        assert_eq!(estado("mpf", "PRM-JI PARANÁ"), "RO");
        assert_eq!(estado("mpf", "PGR"), "DF");
    }

    #[test]
    fn test_mpf_misses_fall_back_to_df() {
        let unknown_city = resolve_estado("mpf", "PRM-ATLANTIDA");
        assert_eq!(unknown_city.estado, "DF");
        assert!(unknown_city.fallback);

        let unknown_region = resolve_estado("mpf", "PRR9");
        assert_eq!(unknown_region.estado, "DF");
        assert!(unknown_region.fallback);
    }

    #[test]
    fn test_mpt_regions() {
        assert_eq!(estado("mpt", "PRT DA 2ª REGIÃO"), "SP");
        assert_eq!(estado("mpt", "PRT da 15º Região"), "SP");
        assert_eq!(estado("mpt", "PRT DA 24ª REGIAO"), "MS");
        assert_eq!(estado("mpt", "PRT DA 30ª REGIAO"), "DF");
        assert_eq!(estado("mpt", "PROCURADORIA GERAL DO TRABALHO"), "DF");
    }

    #[test]
    fn test_mpm_slash_suffix() {
        assert_eq!(estado("mpm", "PROCURADORIA DE JUSTIÇA MILITAR EM SANTA MARIA/RS"), "RS");
        assert_eq!(estado("mpm", "PROCURADORIA-GERAL"), "DF");
    }

    #[test]
    fn test_mpdft_is_always_df() {
        let resolution = resolve_estado("mpdft", "PROMOTORIA DE CEILÂNDIA");
        assert_eq!(resolution.estado, "DF");
        assert!(!resolution.fallback);
    }

    #[test]
    fn test_tables_have_expected_sizes() {
        assert_eq!(TRT_REGIAO_ESTADO.len(), 24);
        assert_eq!(PRR_REGIAO_ESTADO.len(), 6);
        assert!(PRM_CIDADE_ESTADO.len() > 100);
    }
}
