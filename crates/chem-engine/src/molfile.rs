//! Lector mínimo de molfiles V2000 (bloque de conteos, átomos, enlaces y
//! propiedades `M  CHG` / `M  ISO`).
//!
//! Sólo se conserva lo necesario para escribir una notación lineal: elemento,
//! carga, isótopo y conectividad. Coordenadas y estereoquímica se descartan.

use crate::error::ParseFailure;

/// Símbolos aceptados en el bloque de átomos (`*` = átomo comodín).
const ELEMENTS: &[&str] = &["H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
                            "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
                            "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd",
                            "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
                            "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os",
                            "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa",
                            "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg",
                            "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og", "*"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub element: String,
    pub charge: i8,
    /// Número másico explícito; 0 = abundancia natural.
    pub isotope: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    /// Índices base 0.
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MolGraph {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

/// Interpreta un molfile V2000.
pub fn parse_molblock(text: &str) -> Result<MolGraph, ParseFailure> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let counts = lines.get(3).ok_or(ParseFailure::Truncated("línea de conteos"))?;
    if counts.contains("V3000") {
        return Err(ParseFailure::Unsupported("molfile V3000".into()));
    }
    let (n_atoms, n_bonds) = parse_counts(counts)?;
    if n_atoms == 0 {
        return Err(ParseFailure::NoAtoms);
    }

    let first_atom = 4;
    let first_bond = first_atom + n_atoms;
    let first_prop = first_bond + n_bonds;
    if lines.len() < first_bond {
        return Err(ParseFailure::Truncated("bloque de átomos"));
    }
    if lines.len() < first_prop {
        return Err(ParseFailure::Truncated("bloque de enlaces"));
    }

    let mut atoms = Vec::with_capacity(n_atoms);
    for (index, line) in lines[first_atom..first_bond].iter().enumerate() {
        atoms.push(parse_atom(index, line)?);
    }

    let mut bonds = Vec::with_capacity(n_bonds);
    for (index, line) in lines[first_bond..first_prop].iter().enumerate() {
        bonds.push(parse_bond(index, line, n_atoms)?);
    }

    apply_properties(&mut atoms, &lines[first_prop..])?;
    Ok(MolGraph { atoms, bonds })
}

/// Máximo representable en las columnas de tres dígitos de V2000.
const MAX_V2000_COUNT: usize = 999;

/// Columnas fijas `aaabbb`; si no calzan, se intenta por espacios.
fn parse_counts(line: &str) -> Result<(usize, usize), ParseFailure> {
    let fixed = fixed_usize(line, 0..3).zip(fixed_usize(line, 3..6));
    if let Some(counts) = fixed {
        return Ok(counts);
    }
    let mut cols = line.split_whitespace()
                       .map(|c| c.parse::<usize>().ok().filter(|n| *n <= MAX_V2000_COUNT));
    match (cols.next().flatten(), cols.next().flatten()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ParseFailure::InvalidCounts(line.to_string())),
    }
}

fn fixed_usize(line: &str, range: std::ops::Range<usize>) -> Option<usize> {
    line.get(range)?.trim().parse().ok()
}

fn parse_atom(index: usize, line: &str) -> Result<Atom, ParseFailure> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    let invalid = |reason: &str| ParseFailure::InvalidAtom { index,
                                                             reason: reason.to_string() };

    let symbol = match line.get(31..34).map(str::trim) {
        Some(s) if !s.is_empty() && line.len() >= 39 => s,
        _ => cols.get(3).copied().ok_or_else(|| invalid("faltan columnas"))?,
    };
    let (element, isotope) = match symbol {
        "D" => ("H", 2),
        "T" => ("H", 3),
        other => (other, 0),
    };
    if !ELEMENTS.contains(&element) {
        return Err(invalid(&format!("elemento desconocido {symbol:?}")));
    }

    // Código de carga heredado del bloque de átomos (columna 6).
    let code = line.get(36..39)
                   .and_then(|c| c.trim().parse::<u8>().ok())
                   .or_else(|| cols.get(5).and_then(|c| c.parse::<u8>().ok()))
                   .unwrap_or(0);
    let charge = match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    };

    Ok(Atom { element: element.to_string(),
              charge,
              isotope })
}

fn parse_bond(index: usize, line: &str, n_atoms: usize) -> Result<Bond, ParseFailure> {
    let invalid = |reason: String| ParseFailure::InvalidBond { index, reason };

    let fixed = fixed_usize(line, 0..3).zip(fixed_usize(line, 3..6)).zip(fixed_usize(line, 6..9));
    let ((a, b), kind) = match fixed {
        Some(parsed) => parsed,
        None => {
            let cols: Vec<usize> = line.split_whitespace().take(3).filter_map(|c| c.parse().ok()).collect();
            match cols.as_slice() {
                [a, b, kind] => ((*a, *b), *kind),
                _ => return Err(invalid(format!("línea ilegible {line:?}"))),
            }
        }
    };

    if a == 0 || b == 0 || a > n_atoms || b > n_atoms || a == b {
        return Err(invalid(format!("átomos fuera de rango ({a}, {b})")));
    }
    let order = match kind {
        1 => BondOrder::Single,
        2 => BondOrder::Double,
        3 => BondOrder::Triple,
        4 => BondOrder::Aromatic,
        other => return Err(invalid(format!("tipo de enlace de consulta {other}"))),
    };
    Ok(Bond { a: a - 1,
              b: b - 1,
              order })
}

/// `M  CHG` reemplaza todas las cargas del bloque de átomos; `M  ISO` fija
/// números másicos. El resto de propiedades se ignora.
fn apply_properties(atoms: &mut [Atom], lines: &[&str]) -> Result<(), ParseFailure> {
    let mut charges_reset = false;
    for line in lines {
        if line.trim_end() == "M  END" {
            break;
        }
        let Some(kind) = line.strip_prefix("M  ").and_then(|rest| rest.get(..3)) else {
            continue;
        };
        if kind != "CHG" && kind != "ISO" {
            continue;
        }
        if kind == "CHG" && !charges_reset {
            atoms.iter_mut().for_each(|a| a.charge = 0);
            charges_reset = true;
        }

        let values: Vec<i32> = line[6..].split_whitespace().filter_map(|v| v.parse().ok()).collect();
        // Primer valor = número de pares atom/valor.
        for pair in values.iter().skip(1).collect::<Vec<_>>().chunks(2) {
            let [atom, value] = pair else { break };
            let idx = usize::try_from(**atom).ok()
                                              .filter(|i| (1..=atoms.len()).contains(i))
                                              .ok_or_else(|| ParseFailure::InvalidAtom {
                                                  index: atoms.len(),
                                                  reason: format!("M  {kind} apunta al átomo {atom}"),
                                              })?;
            let target = &mut atoms[idx - 1];
            if kind == "CHG" {
                target.charge = i8::try_from(**value).unwrap_or(0);
            } else {
                target.isotope = u16::try_from(**value).unwrap_or(0);
            }
        }
    }
    Ok(())
}
