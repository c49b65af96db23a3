use std::{num::NonZeroU32, path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use nalgebra::DVector;
use qchem_core::{
    basis::BasisSet,
    config,
    hf::{
        restricted_hartree_fock, unrestricted_hartree_fock, HartreeFockConfig,
        RestrictedHartreeFockOutput, UnrestrictedHartreeFockOutput,
    },
    molecular_data::{MolecularData, OrthonormalBasis},
    molecule::{Molecule, Units},
    objective::RestrictedHartreeFockObjective,
    optim::{Bfgs, MinimizationConfig, MinimizationResult, Minimizer, SteepestDescent},
    periodic_table::ElementType,
    system::MolecularSystem,
    transform::IntegralOrdering,
    Error,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: QcCommand,

    /// log progress of the calculations (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct SystemArgs {
    /// A path to the molecule to perform the calculation on
    #[arg(long, short)]
    molecule: PathBuf,
    /// Name of a built-in basis set or path to a basis set exchange json file
    #[arg(long, short, default_value = "STO-3G")]
    basis_set: String,
}

#[derive(Args, Debug)]
struct ScfArgs {
    /// The maximum number of iterations the SCF loop should attempt before the
    /// system is considered to not converge
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,
    /// if the rms of the density matrix drops below this, the system is considered
    /// converged
    #[arg(long, default_value_t = 1e-8)]
    epsilon: f64,
}

impl From<&ScfArgs> for HartreeFockConfig {
    fn from(args: &ScfArgs) -> Self {
        HartreeFockConfig {
            max_iterations: args.max_iterations,
            epsilon: args.epsilon,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Orbitals {
    Canonical,
    Lowdin,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Method {
    Bfgs,
    SteepestDescent,
}

#[derive(Subcommand, Debug)]
enum QcCommand {
    /// Restricted hartree fock for a closed shell molecule
    #[command(name = "rhf")]
    RestrictedHartreeFock {
        #[command(flatten)]
        system: SystemArgs,
        #[command(flatten)]
        scf: ScfArgs,
    },
    /// Unrestricted hartree fock, for any spin state
    #[command(name = "uhf")]
    UnrestrictedHartreeFock {
        #[command(flatten)]
        system: SystemArgs,
        /// Overrides the charge of the molecule file
        #[arg(long, short, allow_hyphen_values = true)]
        charge: Option<i32>,
        /// Overrides the spin multiplicity of the molecule file
        #[arg(long, short = 's')]
        multiplicity: Option<NonZeroU32>,
        #[command(flatten)]
        scf: ScfArgs,
    },
    /// Compute atomic and molecular orbital integrals and check that they transform
    /// into each other
    Integrals {
        #[command(flatten)]
        system: SystemArgs,
        #[command(flatten)]
        scf: ScfArgs,
        /// largest tolerated deviation after transforming to molecular orbitals and back
        #[arg(long, default_value_t = 1e-8)]
        tolerance: f64,
        /// save the integrals as json
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Minimize the restricted hartree fock energy over orbital rotations
    Minimize {
        #[command(flatten)]
        system: SystemArgs,
        #[command(flatten)]
        scf: ScfArgs,
        /// the orthonormal orbitals the rotation starts from
        #[arg(long, value_enum, default_value_t = Orbitals::Lowdin)]
        orbitals: Orbitals,
        #[arg(long, value_enum, default_value_t = Method::Bfgs)]
        method: Method,
        /// start from random rotation parameters drawn with this seed instead of zero
        #[arg(long)]
        seed: Option<u64>,
        /// random parameters are drawn uniformly from [-scale, scale]
        #[arg(long, default_value_t = 0.1)]
        scale: f64,
        #[arg(long, default_value_t = 500)]
        max_steps: usize,
        #[arg(long, default_value_t = 1e-6)]
        gradient_tolerance: f64,
    },
    /// Hartree fock energies of a diatomic molecule over a range of bond lengths
    Scan {
        /// the two elements of the molecule, e.g. `H H` or `Li H`
        #[arg(num_args = 2, required = true)]
        elements: Vec<ElementType>,
        #[arg(long, short, default_value = "STO-3G")]
        basis_set: String,
        /// shortest bond length in Ångström
        #[arg(long, default_value_t = 0.3)]
        start: f64,
        /// longest bond length in Ångström
        #[arg(long, default_value_t = 2.5)]
        stop: f64,
        #[arg(long, default_value_t = 12)]
        points: usize,
        #[arg(long, short, default_value_t = 0, allow_hyphen_values = true)]
        charge: i32,
        #[arg(long, short = 's', default_value_t = NonZeroU32::MIN)]
        multiplicity: NonZeroU32,
        #[command(flatten)]
        scf: ScfArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    pretty_env_logger::formatted_builder()
        .filter_level(if cli.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    match cli.command {
        QcCommand::RestrictedHartreeFock { system, scf } => {
            let (molecule, basis_set) = load(&system)?;
            let system = MolecularSystem::new(molecule, &basis_set)?;

            let start = Instant::now();
            let output = restricted_hartree_fock(&system, &(&scf).into())?;
            print_restricted(&output, start);
        }

        QcCommand::UnrestrictedHartreeFock {
            system,
            charge,
            multiplicity,
            scf,
        } => {
            let (mut molecule, basis_set) = load(&system)?;
            if let Some(charge) = charge {
                molecule = molecule.with_charge(charge);
            }
            if let Some(multiplicity) = multiplicity {
                molecule = molecule.with_multiplicity(multiplicity);
            }
            let system = MolecularSystem::new(molecule, &basis_set)?;

            let start = Instant::now();
            let output = unrestricted_hartree_fock(&system, &(&scf).into())?;
            print_unrestricted(&output, start);
        }

        QcCommand::Integrals {
            system,
            scf,
            tolerance,
            output,
        } => {
            let (molecule, basis_set) = load(&system)?;
            let data = MolecularData::compute(molecule, &basis_set, &(&scf).into())?;

            println!("{} in {}", data.description, data.basis);
            println!("orbitals: {}, electrons: {}", data.n_orbitals, data.n_electrons);
            println!("nuclear repulsion energy: {:.10}", data.nuclear_repulsion);
            println!("hartree fock energy: {:.10}", data.hf_energy);
            println!("orbital energies: {:.6?}", data.orbital_energies);

            let deviation = data
                .check_basis_roundtrip(tolerance)
                .context("molecular orbital integrals do not transform back")?;
            println!("AO -> MO -> AO round trip deviation: {deviation:.3e}");

            let one_body_mo = data.one_body_integrals()?;
            let two_body_mo = data.two_body_integrals(IntegralOrdering::Chemist)?;
            let one_body_difference = (&one_body_mo - &data.one_body_ao).amax();
            let two_body_difference = two_body_mo.max_abs_diff(&data.two_body_ao);
            println!(
                "AO and MO integrals differ by up to {one_body_difference:.6} (one body) and {two_body_difference:.6} (two body)"
            );

            let hamiltonian = data.hamiltonian()?;
            println!(
                "spin orbital hamiltonian: {} modes, reference energy {:.10}",
                hamiltonian.n_spin_orbitals(),
                hamiltonian.hartree_fock_energy(data.n_electrons)?
            );

            if let Some(path) = output {
                data.save(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("saved integrals to {}", path.display());
            }
        }

        QcCommand::Minimize {
            system,
            scf,
            orbitals,
            method,
            seed,
            scale,
            max_steps,
            gradient_tolerance,
        } => {
            let (molecule, basis_set) = load(&system)?;
            let data = MolecularData::compute(molecule, &basis_set, &(&scf).into())?;

            let basis = match orbitals {
                Orbitals::Canonical => OrthonormalBasis::Canonical,
                Orbitals::Lowdin => OrthonormalBasis::Lowdin,
            };
            let (objective, _) = RestrictedHartreeFockObjective::from_molecular_data(&data, basis)?;

            let n_parameters = objective.n_parameters();
            let initial_guess = match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    DVector::from_fn(n_parameters, |_, _| rng.gen_range(-scale..=scale))
                }
                None => DVector::zeros(n_parameters),
            };

            let config = MinimizationConfig {
                max_iterations: max_steps,
                gradient_tolerance,
                ..Default::default()
            };

            let start = Instant::now();
            let result = match method {
                Method::Bfgs => Bfgs.minimize(&objective, initial_guess, &config)?,
                Method::SteepestDescent => {
                    SteepestDescent.minimize(&objective, initial_guess, &config)?
                }
            };
            print_minimization(&result, &data, start);
        }

        QcCommand::Scan {
            elements,
            basis_set,
            start,
            stop,
            points,
            charge,
            multiplicity,
            scf,
        } => {
            let &[first, second] = elements.as_slice() else {
                bail!("a scan needs exactly two elements");
            };
            if points < 2 || stop <= start {
                bail!("a scan needs at least two points and stop > start");
            }
            let basis_set = config::load_basis_set(&basis_set)?;
            let scf = HartreeFockConfig::from(&scf);

            println!("{:>14} {:>20}", "length (Å)", "energy (Eh)");
            for point in 0..points {
                let length = start + (stop - start) * point as f64 / (points - 1) as f64;
                let molecule = Molecule::from_geometry(
                    &[(first, [0.0; 3]), (second, [0.0, 0.0, length])],
                    Units::Angstrom,
                )
                .with_charge(charge)
                .with_multiplicity(multiplicity);
                let system = MolecularSystem::new(molecule, &basis_set)?;

                let energy = if multiplicity.get() == 1 {
                    restricted_hartree_fock(&system, &scf).map(|output| output.total_energy())
                } else {
                    unrestricted_hartree_fock(&system, &scf).map(|output| output.total_energy())
                };

                match energy {
                    Ok(energy) => println!("{length:>14.4} {energy:>20.10}"),
                    Err(Error::NotConverged { iterations }) => {
                        log::warn!("no convergence at {length} Å after {iterations} iterations");
                        println!("{length:>14.4} {:>20}", "not converged");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    Ok(())
}

fn load(args: &SystemArgs) -> anyhow::Result<(Molecule, BasisSet)> {
    let molecule = config::load_molecule(&args.molecule)
        .with_context(|| format!("reading molecule {}", args.molecule.display()))?;
    let basis_set = config::load_basis_set(&args.basis_set)
        .with_context(|| format!("loading basis set {}", args.basis_set))?;
    Ok((molecule, basis_set))
}

fn print_restricted(output: &RestrictedHartreeFockOutput, start: Instant) {
    println!(
        "hartree fock converged after {} iterations and {:0.2?}",
        output.iterations,
        start.elapsed()
    );
    println!("electronic energy: {:.10}", output.electronic_energy);
    println!("nuclear repulsion energy: {:.10}", output.nuclear_repulsion);
    println!("hartree fock energy: {:.10}", output.total_energy());
    println!("orbital energies: {:.6?}", output.orbital_energies);
}

fn print_unrestricted(output: &UnrestrictedHartreeFockOutput, start: Instant) {
    println!(
        "hartree fock converged after {} iterations and {:0.2?}",
        output.iterations,
        start.elapsed()
    );
    println!("alpha electrons: {}, beta electrons: {}", output.n_alpha, output.n_beta);
    println!("electronic energy: {:.10}", output.electronic_energy);
    println!("nuclear repulsion energy: {:.10}", output.nuclear_repulsion);
    println!("hartree fock energy: {:.10}", output.total_energy());
    println!("orbital energies alpha spin: {:.6?}", output.orbital_energies_alpha);
    println!("orbital energies beta spin:  {:.6?}", output.orbital_energies_beta);
}

fn print_minimization(result: &MinimizationResult, data: &MolecularData, start: Instant) {
    if result.converged {
        println!(
            "minimization converged after {} iterations and {:0.2?}",
            result.iterations,
            start.elapsed()
        );
    } else {
        println!(
            "minimization stopped after {} iterations without converging",
            result.iterations
        );
    }
    println!("initial energy: {:.10}", result.history[0]);
    println!("final energy:   {:.10}", result.value);
    println!("scf energy:     {:.10}", data.hf_energy);
    println!("difference:     {:.3e}", result.value - data.hf_energy);
    println!("gradient norm:  {:.3e}", result.gradient_norm);
}
