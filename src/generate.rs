/*!
Uniform random k-SAT instances.

Every clause draws `k` distinct variables and an independent polarity for
each. With `k = 3` and a clause/variable ratio near 4.26 this is the
distribution of the SATLIB `uf`/`uuf` benchmark families.
*/

use rand::{rngs::StdRng, seq::index::sample, Rng, SeedableRng};

use crate::formula::{Clause, Cnf, Variable};

/// Generates a random formula. The same seed always yields the same formula.
///
/// # Panics
///
/// Panics if `k` exceeds `num_variables`.
pub fn random_ksat(num_variables: usize, num_clauses: usize, k: usize, seed: u64) -> Cnf {
    assert!(k <= num_variables, "a clause needs {} distinct variables", k);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut cnf = Cnf::new(num_variables);

    for _ in 0..num_clauses {
        let literals = sample(&mut rng, num_variables, k)
            .into_iter()
            .map(|index| Variable::from(index).literal(rng.gen()))
            .collect();
        cnf.add_clause(Clause::new(literals));
    }

    cnf
}
