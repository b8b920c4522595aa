use crate::iupac_code::reverse_complement;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default promoter margins around the transcription initiation site, in bp.
pub const DEFAULT_UPSTREAM: usize = 2000;
pub const DEFAULT_DOWNSTREAM: usize = 500;

/// Genomic placement of a gene, as reported by the NCBI gene summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneInfo {
    pub name: String,
    pub chraccver: String,
    pub chrstart: usize,
    pub chrstop: usize,
}

/// A promoter region ready to be searched. `tis_offset` is the position
/// of the transcription initiation site within `sequence`, i.e. the
/// upstream margin the region was cut with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Promoter {
    pub gene_name: String,
    pub accession: String,
    pub tis_offset: usize,
    pub sequence: String,
}

fn esummary_url(gene_id: &str, species: &str) -> String {
    format!("{EUTILS_BASE_URL}/esummary.fcgi?db=gene&id={gene_id}&retmode=json&species={species}")
}

fn efetch_url(accession: &str) -> String {
    format!("{EUTILS_BASE_URL}/efetch.fcgi?db=nuccore&id={accession}&rettype=fasta&retmode=text")
}

/// Resolves a gene identifier to its name and chromosomal coordinates.
pub fn fetch_gene_info(gene_id: &str, species: &str) -> Result<GeneInfo> {
    let response = reqwest::blocking::get(esummary_url(gene_id, species))?.error_for_status()?;
    let json: Value = response.json()?;
    parse_gene_summary(&json, gene_id)
}

fn parse_gene_summary(json: &Value, gene_id: &str) -> Result<GeneInfo> {
    let record = &json["result"][gene_id];
    if record.is_null() {
        return Err(anyhow!("No summary record for gene {gene_id}"));
    }
    let name = record["name"]
        .as_str()
        .ok_or_else(|| anyhow!("Gene {gene_id} has no name"))?
        .to_string();
    let genomic = record["genomicinfo"]
        .get(0)
        .ok_or_else(|| anyhow!("Gene {gene_id} has no genomic placement"))?;
    let chraccver = genomic["chraccver"]
        .as_str()
        .ok_or_else(|| anyhow!("Gene {gene_id} has no chromosome accession"))?
        .to_string();
    let chrstart = genomic["chrstart"]
        .as_u64()
        .ok_or_else(|| anyhow!("Gene {gene_id} has no chrstart"))? as usize;
    let chrstop = genomic["chrstop"]
        .as_u64()
        .ok_or_else(|| anyhow!("Gene {gene_id} has no chrstop"))? as usize;
    Ok(GeneInfo {
        name,
        chraccver,
        chrstart,
        chrstop,
    })
}

/// Downloads one chromosome (or contig) as a bare base string.
pub fn fetch_chromosome(accession: &str) -> Result<String> {
    let text = reqwest::blocking::get(efetch_url(accession))?
        .error_for_status()?
        .text()?;
    strip_fasta_header(&text, accession)
}

fn strip_fasta_header(text: &str, accession: &str) -> Result<String> {
    let mut lines = text.lines();
    match lines.next() {
        Some(header) if header.starts_with('>') => Ok(lines.collect()),
        _ => Err(anyhow!("Response for {accession} is not FASTA")),
    }
}

/// Cuts the promoter region around the transcription initiation site.
/// A gene annotated with start > stop lies on the minus strand; its
/// region is cut mirror-wise and reverse-complemented, since the
/// sequence fetcher hands out plus-strand bases. Bounds are clamped to
/// the chromosome.
pub fn promoter_region(
    chromosome: &str,
    chrstart: usize,
    chrstop: usize,
    upstream: usize,
    downstream: usize,
) -> Result<String> {
    let bases = chromosome.as_bytes();
    let (start, end, minus_strand) = if chrstop > chrstart {
        (
            chrstart.saturating_sub(upstream),
            (chrstart + downstream).min(bases.len()),
            false,
        )
    } else {
        (
            chrstart.saturating_sub(downstream),
            (chrstart + upstream).min(bases.len()),
            true,
        )
    };
    if start >= end {
        return Err(anyhow!(
            "Promoter region around position {chrstart} is empty"
        ));
    }
    let region = if minus_strand {
        reverse_complement(&bases[start..end])
    } else {
        bases[start..end].to_vec()
    };
    Ok(String::from_utf8_lossy(&region).to_string())
}

/// Resolves a gene, downloads its chromosome and cuts the promoter.
/// Network failures surface as errors; nothing is retried here.
pub fn fetch_promoter(
    gene_id: &str,
    species: &str,
    upstream: usize,
    downstream: usize,
) -> Result<Promoter> {
    let info = fetch_gene_info(gene_id, species)?;
    let chromosome = fetch_chromosome(&info.chraccver)?;
    let sequence = promoter_region(&chromosome, info.chrstart, info.chrstop, upstream, downstream)?;
    Ok(Promoter {
        gene_name: info.name,
        accession: info.chraccver,
        tis_offset: upstream,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eutils_urls() {
        assert_eq!(
            esummary_url("4843", "Human"),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esummary.fcgi?db=gene&id=4843&retmode=json&species=Human"
        );
        assert_eq!(
            efetch_url("NC_000017.11"),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi?db=nuccore&id=NC_000017.11&rettype=fasta&retmode=text"
        );
    }

    #[test]
    fn test_parse_gene_summary() {
        let json = json!({
            "result": {
                "4843": {
                    "name": "NOS2",
                    "genomicinfo": [{
                        "chraccver": "NC_000017.11",
                        "chrstart": 27800529,
                        "chrstop": 27756766
                    }]
                }
            }
        });
        let info = parse_gene_summary(&json, "4843").unwrap();
        assert_eq!(
            info,
            GeneInfo {
                name: "NOS2".to_string(),
                chraccver: "NC_000017.11".to_string(),
                chrstart: 27800529,
                chrstop: 27756766,
            }
        );
    }

    #[test]
    fn test_parse_gene_summary_without_placement() {
        let json = json!({ "result": { "1": { "name": "X", "genomicinfo": [] } } });
        assert!(parse_gene_summary(&json, "1").is_err());
        assert!(parse_gene_summary(&json, "2").is_err());
    }

    #[test]
    fn test_strip_fasta_header() {
        let text = ">NC_000017.11 Homo sapiens chromosome 17\nACGT\nACGT\n";
        assert_eq!(strip_fasta_header(text, "NC_000017.11").unwrap(), "ACGTACGT");
        assert!(strip_fasta_header("ACGT", "NC_000017.11").is_err());
    }

    #[test]
    fn test_promoter_region_plus_strand() {
        //             0123456789
        let chromosome = "ACGTACGTAC";
        let region = promoter_region(chromosome, 4, 8, 2, 3).unwrap();
        assert_eq!(region, "GTACG");
    }

    #[test]
    fn test_promoter_region_minus_strand_is_reverse_complemented() {
        let chromosome = "ACGTACGTAC";
        let region = promoter_region(chromosome, 6, 2, 3, 2).unwrap();
        // Plus-strand cut [4, 9) is ACGTA
        assert_eq!(region, "TACGT");
    }

    #[test]
    fn test_promoter_region_clamps_to_chromosome() {
        let chromosome = "ACGTACGT";
        let region = promoter_region(chromosome, 2, 6, 100, 100).unwrap();
        assert_eq!(region, "ACGTACGT");
    }

    #[test]
    fn test_empty_promoter_region_is_an_error() {
        assert!(promoter_region("", 0, 5, 10, 10).is_err());
    }
}
