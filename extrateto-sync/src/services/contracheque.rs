//! Typed payroll line items
//!
//! The decoded table is only read here: each row becomes a
//! [`LinhaContracheque`] and no untyped row map travels further.

use extrateto_common::csv::{Row, Table};
use extrateto_common::normalize::categoria::Categoria;
use extrateto_common::normalize::{classify_valor, ValorParse};

/// Upstream column names
pub mod colunas {
    pub const NOME: &str = "nome";
    pub const VALOR: &str = "valor";
    pub const CATEGORIA: &str = "categoria_contracheque";
    pub const MACRO: &str = "desambiguacao_macro";
    pub const CARGO: &str = "cargo";
    pub const LOTACAO: &str = "lotacao";
}

/// One payroll line item of one member
#[derive(Debug, Clone, PartialEq)]
pub struct LinhaContracheque {
    pub nome: String,
    pub valor: ValorParse,
    pub categoria: Categoria,
    /// Sub-category tag for `outras`, lowercased
    pub macro_tag: String,
    pub cargo: String,
    pub lotacao: String,
}

impl LinhaContracheque {
    /// Map one decoded row; rows without a member name yield `None`
    pub fn from_row(row: &Row<'_>) -> Option<Self> {
        let nome = row.get(colunas::NOME).trim();
        if nome.is_empty() {
            return None;
        }

        Some(Self {
            nome: nome.to_string(),
            valor: classify_valor(row.get(colunas::VALOR)),
            categoria: Categoria::parse(row.get(colunas::CATEGORIA)),
            macro_tag: row.get(colunas::MACRO).trim().to_lowercase(),
            cargo: row.get(colunas::CARGO).trim().to_string(),
            lotacao: row.get(colunas::LOTACAO).trim().to_string(),
        })
    }
}

/// All named line items of a table, with the count of nameless rows skipped
pub fn linhas(table: &Table) -> (Vec<LinhaContracheque>, usize) {
    let mut skipped = 0;
    let linhas = table
        .rows()
        .filter_map(|row| {
            let linha = LinhaContracheque::from_row(&row);
            if linha.is_none() {
                skipped += 1;
            }
            linha
        })
        .collect();
    (linhas, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrateto_common::csv::decode;

    #[test]
    fn test_row_mapping() {
        let table = decode(
            "nome,cargo,lotacao,categoria_contracheque,desambiguacao_macro,valor\n\
             \" Ana Lima \",Juiz de Direito,Comarca X,OUTRAS,Aux-Alimentacao,\"1.500,00\"",
        );
        let linha = LinhaContracheque::from_row(&table.rows().next().unwrap()).unwrap();

        assert_eq!(linha.nome, "Ana Lima");
        assert_eq!(linha.categoria, Categoria::Outras);
        assert_eq!(linha.macro_tag, "aux-alimentacao");
        assert_eq!(linha.valor, ValorParse::Parsed(1500.0));
        assert_eq!(linha.lotacao, "Comarca X");
    }

    #[test]
    fn test_nameless_rows_skipped_and_counted() {
        let table = decode("nome,valor\nAna,100\n,200\n   ,300");
        let (linhas, skipped) = linhas(&table);
        assert_eq!(linhas.len(), 1);
        assert_eq!(skipped, 2);
    }
}
