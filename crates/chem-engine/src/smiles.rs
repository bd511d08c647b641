//! Escritura de SMILES a partir de un `MolGraph`.
//!
//! El recorrido es un DFS que empieza por el átomo de menor índice de cada
//! componente y visita vecinos en orden de índice, de modo que la salida es
//! estable para un mismo molfile. No es una canonicalización: dos molfiles
//! con distinto orden de átomos pueden producir cadenas distintas (para eso
//! está el backend RDKit).

use crate::molfile::{BondOrder, MolGraph};

/// Elementos que pueden escribirse sin corchetes.
const ORGANIC_SUBSET: &[&str] = &["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];
/// Electrones de valencia del subconjunto orgánico y si admite valencias
/// expandidas (P, S y halógenos pesados).
const VALENCE_ELECTRONS: &[(&str, i16, bool)] = &[("B", 3, false),
                                                  ("C", 4, false),
                                                  ("N", 5, false),
                                                  ("O", 6, false),
                                                  ("P", 5, true),
                                                  ("S", 6, true),
                                                  ("F", 7, false),
                                                  ("Cl", 7, true),
                                                  ("Br", 7, true),
                                                  ("I", 7, true)];
/// Elementos con forma aromática en minúsculas.
const AROMATIC_CAPABLE: &[&str] = &["B", "C", "N", "O", "P", "S", "Se", "As"];

pub fn write_smiles(graph: &MolGraph) -> String {
    let mut walker = Walker::new(graph);
    let mut components = Vec::new();
    for start in 0..graph.atoms.len() {
        if walker.hidden[start] || walker.order[start].is_some() {
            continue;
        }
        walker.discover(start);
        let mut out = String::new();
        let mut rings = RingNumbers::default();
        walker.emit(start, &mut out, &mut rings);
        components.push(out);
    }
    components.join(".")
}

struct Walker<'a> {
    graph: &'a MolGraph,
    /// Vecinos (átomo, enlace) ordenados por índice de átomo.
    adjacency: Vec<Vec<(usize, usize)>>,
    /// Hidrógenos neutros terminales que se omiten de la cadena.
    hidden: Vec<bool>,
    /// Hidrógenos omitidos por átomo pesado.
    h_count: Vec<u8>,
    aromatic: Vec<bool>,
    order: Vec<Option<usize>>,
    children: Vec<Vec<(usize, usize)>>,
    closures: Vec<Vec<(usize, usize)>>,
    seen_bond: Vec<bool>,
    counter: usize,
}

impl<'a> Walker<'a> {
    fn new(graph: &'a MolGraph) -> Self {
        let n = graph.atoms.len();
        let mut adjacency = vec![Vec::new(); n];
        for (idx, bond) in graph.bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, idx));
            adjacency[bond.b].push((bond.a, idx));
        }
        adjacency.iter_mut().for_each(|list| list.sort_unstable());

        let mut hidden = vec![false; n];
        let mut h_count = vec![0u8; n];
        for (idx, atom) in graph.atoms.iter().enumerate() {
            if atom.element != "H" || atom.charge != 0 || atom.isotope != 0 || adjacency[idx].len() != 1 {
                continue;
            }
            let (neighbor, bond) = adjacency[idx][0];
            if graph.atoms[neighbor].element != "H" && graph.bonds[bond].order == BondOrder::Single {
                hidden[idx] = true;
                h_count[neighbor] = h_count[neighbor].saturating_add(1);
            }
        }

        let mut aromatic = vec![false; n];
        for bond in graph.bonds.iter().filter(|b| b.order == BondOrder::Aromatic) {
            for idx in [bond.a, bond.b] {
                aromatic[idx] = AROMATIC_CAPABLE.contains(&graph.atoms[idx].element.as_str());
            }
        }

        Self { graph,
               adjacency,
               hidden,
               h_count,
               aromatic,
               order: vec![None; n],
               children: vec![Vec::new(); n],
               closures: vec![Vec::new(); n],
               seen_bond: vec![false; graph.bonds.len()],
               counter: 0 }
    }

    /// Primera pasada: orden de visita, aristas de árbol y cierres de anillo.
    fn discover(&mut self, atom: usize) {
        self.order[atom] = Some(self.counter);
        self.counter += 1;
        for i in 0..self.adjacency[atom].len() {
            let (next, bond) = self.adjacency[atom][i];
            if self.hidden[next] || self.seen_bond[bond] {
                continue;
            }
            self.seen_bond[bond] = true;
            if self.order[next].is_some() {
                self.closures[atom].push((next, bond));
                self.closures[next].push((atom, bond));
            } else {
                self.children[atom].push((next, bond));
                self.discover(next);
            }
        }
    }

    fn emit(&self, atom: usize, out: &mut String, rings: &mut RingNumbers) {
        out.push_str(&self.atom_symbol(atom));

        let mut closures = self.closures[atom].clone();
        closures.sort_by_key(|(other, _)| self.order[*other]);
        for (other, bond) in closures {
            // El extremo visitado primero abre el anillo y escribe el enlace.
            if self.order[other] > self.order[atom] {
                out.push_str(self.bond_symbol(bond));
                out.push_str(&ring_label(rings.open(bond)));
            } else {
                out.push_str(&ring_label(rings.close(bond)));
            }
        }

        let children = &self.children[atom];
        for (i, &(child, bond)) in children.iter().enumerate() {
            let branch = i + 1 < children.len();
            if branch {
                out.push('(');
            }
            out.push_str(self.bond_symbol(bond));
            self.emit(child, out, rings);
            if branch {
                out.push(')');
            }
        }
    }

    fn bond_symbol(&self, bond: usize) -> &'static str {
        let b = &self.graph.bonds[bond];
        let both_aromatic = self.aromatic[b.a] && self.aromatic[b.b];
        match b.order {
            BondOrder::Single if both_aromatic => "-",
            BondOrder::Single => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Aromatic if both_aromatic => "",
            BondOrder::Aromatic => ":",
        }
    }

    /// Hidrógenos implícitos del molfile para un átomo del subconjunto
    /// orgánico: menor valencia permitida (ajustada por carga) que cubre la
    /// suma de órdenes de enlace, incluidos los H explícitos.
    fn implicit_hydrogens(&self, atom: usize) -> u8 {
        let a = &self.graph.atoms[atom];
        let Some(&(_, electrons, hypervalent)) = VALENCE_ELECTRONS.iter().find(|(el, _, _)| *el == a.element) else {
            return 0;
        };
        let effective = electrons - i16::from(a.charge);
        if !(0..=8).contains(&effective) {
            return 0;
        }
        let base = if effective <= 4 { effective } else { 8 - effective };

        let mut used = 0i16;
        let mut aromatic_bonds = 0i16;
        for &(_, bond) in &self.adjacency[atom] {
            used += match self.graph.bonds[bond].order {
                BondOrder::Single => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
                BondOrder::Aromatic => {
                    aromatic_bonds += 1;
                    1
                }
            };
        }
        if aromatic_bonds > 0 {
            used += 1;
        }

        let extra = if hypervalent && effective >= 5 { 2 } else { 0 };
        [base, base + extra, base + 2 * extra].into_iter()
                                              .find(|v| *v >= used)
                                              .and_then(|v| u8::try_from(v - used).ok())
                                              .unwrap_or(0)
    }

    fn atom_symbol(&self, atom: usize) -> String {
        let a = &self.graph.atoms[atom];
        let symbol = if self.aromatic[atom] {
            a.element.to_lowercase()
        } else {
            a.element.clone()
        };
        let plain = a.charge == 0 && a.isotope == 0;
        if plain && (ORGANIC_SUBSET.contains(&a.element.as_str()) || a.element == "*") {
            return symbol;
        }

        let mut out = String::from("[");
        if a.isotope > 0 {
            out.push_str(&a.isotope.to_string());
        }
        out.push_str(&symbol);
        match self.h_count[atom].saturating_add(self.implicit_hydrogens(atom)) {
            0 => {}
            1 => out.push('H'),
            n => out.push_str(&format!("H{n}")),
        }
        match a.charge {
            0 => {}
            1 => out.push('+'),
            -1 => out.push('-'),
            c if c > 0 => out.push_str(&format!("+{c}")),
            c => out.push_str(&format!("{c}")),
        }
        out.push(']');
        out
    }
}

/// Dígitos de anillo; se reutiliza siempre el menor libre.
#[derive(Default)]
struct RingNumbers {
    in_use: Vec<Option<usize>>,
}

impl RingNumbers {
    fn open(&mut self, bond: usize) -> usize {
        match self.in_use.iter().position(Option::is_none) {
            Some(slot) => {
                self.in_use[slot] = Some(bond);
                slot + 1
            }
            None => {
                self.in_use.push(Some(bond));
                self.in_use.len()
            }
        }
    }

    fn close(&mut self, bond: usize) -> usize {
        match self.in_use.iter().position(|b| *b == Some(bond)) {
            Some(slot) => {
                self.in_use[slot] = None;
                slot + 1
            }
            // Sin apertura previa no hay forma válida de cerrar; no ocurre con
            // el orden de emisión del DFS.
            None => 0,
        }
    }
}

fn ring_label(n: usize) -> String {
    if n < 10 {
        n.to_string()
    } else {
        format!("%{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molfile::{Atom, Bond};

    fn atom(element: &str) -> Atom {
        Atom { element: element.into(),
               charge: 0,
               isotope: 0 }
    }

    fn bond(a: usize, b: usize, order: BondOrder) -> Bond {
        Bond { a, b, order }
    }

    #[test]
    fn chain_with_branch() {
        // Ácido acético: C-C(=O)-O
        let graph = MolGraph { atoms: vec![atom("C"), atom("C"), atom("O"), atom("O")],
                               bonds: vec![bond(0, 1, BondOrder::Single),
                                           bond(1, 2, BondOrder::Double),
                                           bond(1, 3, BondOrder::Single)] };
        assert_eq!(write_smiles(&graph), "CC(=O)O");
    }

    #[test]
    fn aromatic_ring_closure() {
        let atoms = vec![atom("C"); 6];
        let bonds = (0..6).map(|i| bond(i, (i + 1) % 6, BondOrder::Aromatic)).collect();
        assert_eq!(write_smiles(&MolGraph { atoms, bonds }), "c1ccccc1");
    }

    #[test]
    fn kekule_ring_closure_carries_bond_order() {
        let atoms = vec![atom("C"); 6];
        let bonds = (0..6).map(|i| {
                              let order = if i % 2 == 0 { BondOrder::Double } else { BondOrder::Single };
                              bond(i, (i + 1) % 6, order)
                          })
                          .collect();
        assert_eq!(write_smiles(&MolGraph { atoms, bonds }), "C1=CC=CC=C1");
    }

    #[test]
    fn explicit_hydrogens_are_folded() {
        // Metanol con todos los H explícitos.
        let mut atoms = vec![atom("C"), atom("O")];
        atoms.extend(std::iter::repeat(atom("H")).take(4));
        let bonds = vec![bond(0, 1, BondOrder::Single),
                         bond(0, 2, BondOrder::Single),
                         bond(0, 3, BondOrder::Single),
                         bond(0, 4, BondOrder::Single),
                         bond(1, 5, BondOrder::Single)];
        assert_eq!(write_smiles(&MolGraph { atoms, bonds }), "CO");
    }

    #[test]
    fn charged_and_disconnected_atoms() {
        let mut na = atom("Na");
        na.charge = 1;
        let mut cl = atom("Cl");
        cl.charge = -1;
        let graph = MolGraph { atoms: vec![na, cl],
                               bonds: vec![] };
        assert_eq!(write_smiles(&graph), "[Na+].[Cl-]");
    }

    #[test]
    fn ammonium_keeps_explicit_hydrogen_count() {
        let mut n = atom("N");
        n.charge = 1;
        let mut atoms = vec![n];
        atoms.extend(std::iter::repeat(atom("H")).take(4));
        let bonds = (1..5).map(|h| bond(0, h, BondOrder::Single)).collect();
        assert_eq!(write_smiles(&MolGraph { atoms, bonds }), "[NH4+]");
    }

    #[test]
    fn isotopes_and_molecular_hydrogen() {
        let mut c13 = atom("C");
        c13.isotope = 13;
        let graph = MolGraph { atoms: vec![c13, atom("H"), atom("H")],
                               bonds: vec![bond(1, 2, BondOrder::Single)] };
        assert_eq!(write_smiles(&graph), "[13CH4].[H][H]");
    }

    #[test]
    fn charged_atoms_get_implicit_hydrogens() {
        // Metilamonio sin H dibujados.
        let mut n = atom("N");
        n.charge = 1;
        let graph = MolGraph { atoms: vec![atom("C"), n],
                               bonds: vec![bond(0, 1, BondOrder::Single)] };
        assert_eq!(write_smiles(&graph), "C[NH3+]");

        // Metóxido, nitro y carbonato.
        let mut o = atom("O");
        o.charge = -1;
        let graph = MolGraph { atoms: vec![atom("C"), o],
                               bonds: vec![bond(0, 1, BondOrder::Single)] };
        assert_eq!(write_smiles(&graph), "C[O-]");

        let mut n = atom("N");
        n.charge = 1;
        let mut o_minus = atom("O");
        o_minus.charge = -1;
        let graph = MolGraph { atoms: vec![atom("C"), n, atom("O"), o_minus],
                               bonds: vec![bond(0, 1, BondOrder::Single),
                                           bond(1, 2, BondOrder::Double),
                                           bond(1, 3, BondOrder::Single)] };
        assert_eq!(write_smiles(&graph), "C[N+](=O)[O-]");
    }

    #[test]
    fn aromatic_cation_keeps_ring_hydrogen() {
        // Piridinio: el N cargado lleva un H implícito.
        let mut atoms = vec![atom("C"); 6];
        atoms[0] = atom("N");
        atoms[0].charge = 1;
        let bonds = (0..6).map(|i| bond(i, (i + 1) % 6, BondOrder::Aromatic)).collect();
        assert_eq!(write_smiles(&MolGraph { atoms, bonds }), "[nH+]1ccccc1");
    }
}
