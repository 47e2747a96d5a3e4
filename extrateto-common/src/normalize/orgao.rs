//! Organ catalogue and display-name mapping

/// Upstream organ ids, in the fixed order the orchestrator processes them
pub const ORGAOS: &[&str] = &[
    // Tribunais de Justiça
    "tjac", "tjal", "tjam", "tjap", "tjba", "tjce", "tjdft", "tjes",
    "tjgo", "tjma", "tjmg", "tjms", "tjmt", "tjpa", "tjpb", "tjpe",
    "tjpi", "tjpr", "tjrj", "tjrn", "tjro", "tjrr", "tjrs", "tjsc",
    "tjse", "tjsp", "tjto",
    // Ministérios Públicos estaduais
    "mppb", "mpac", "mpal", "mpam", "mpap", "mpba", "mpce",
    "mpes", "mpgo", "mpma", "mpmg", "mpms", "mpmt", "mppa", "mppe",
    "mppi", "mppr", "mprj", "mprn", "mpro", "mprr", "mprs", "mpsc",
    "mpse", "mpsp", "mpto",
    // Ramos do Ministério Público da União
    "mpf", "mpt", "mpm", "mpdft",
];

/// Federal prosecutorial branches and their fixed display codes
const FEDERAL: &[(&str, &str)] = &[("mpf", "MPF"), ("mpt", "MPT"), ("mpm", "MPM"), ("mpdft", "MPDFT")];

/// Whether the id is one of the four federal prosecutorial branches
pub fn is_federal(orgao_id: &str) -> bool {
    FEDERAL.iter().any(|(id, _)| *id == orgao_id)
}

/// Whether a canonical display code belongs to a federal branch
pub fn is_federal_code(orgao: &str) -> bool {
    FEDERAL.iter().any(|(_, code)| *code == orgao)
}

/// Map a lowercase upstream organ id to its canonical display code
///
/// `"tjsp"` → `"TJ-SP"`, `"tjdft"` → `"TJ-DF"`, `"mprj"` → `"MP-RJ"`,
/// `"mpf"` → `"MPF"`; anything else is uppercased.
pub fn map_orgao_id(orgao_id: &str) -> String {
    if let Some((_, code)) = FEDERAL.iter().find(|(id, _)| *id == orgao_id) {
        return (*code).to_string();
    }

    let upper = orgao_id.to_uppercase();
    let prefix = upper.get(..2).unwrap_or_default();
    let suffix = upper.get(2..).unwrap_or_default();
    match prefix {
        "TJ" => format!("TJ-{}", state_suffix(suffix)),
        "MP" => format!("MP-{}", suffix),
        _ => orgao_id.to_uppercase(),
    }
}

/// State of a non-federal organ from its id suffix
pub fn estado_from_id(orgao_id: &str) -> String {
    let upper = orgao_id.to_uppercase();
    let suffix = upper.get(2..).unwrap_or_default();
    state_suffix(suffix).to_string()
}

fn state_suffix(suffix: &str) -> &str {
    if suffix == "DFT" {
        "DF"
    } else {
        suffix
    }
}
