// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Effective Potential
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! A model instance together with its tensors and the memoised results
//! that depend on them.
//!
//! Setup runs in a fixed order, tracked by [`ModelStage`]:
//!
//! ```text
//! Uninitialized → TensorsSet → CouplingsComputed → CountertermsSet → TripleCouplingsComputed
//! ```
//!
//! Every operation asserts the stage it needs. Derivatives and
//! counterterms fail with `Precondition` when called too early; triple
//! couplings pull the missing stages in themselves.
//!
//! An instance is not meant to be shared between threads. Give each
//! worker its own instance (see `scan`).

use std::collections::BTreeMap;

use bsmpt_types::{
    BsmptError, BsmptResult, CountertermSet, EngineConfig, MassSpectrum, TripleCouplings,
};

use crate::counterterms::{solve_counterterms, CountertermInput};
use crate::couplings::PhysicalCouplings;
use crate::debye::DebyeCorrections;
use crate::derivatives::{Contributions, DerivativeEngine};
use crate::mixing::{classify, Mixing};
use crate::model::ModelDefinition;
use crate::spectral::{hermitian_eigenvalues, orthogonality_defect, symmetric_eigen};
use crate::tensors::ModelTensors;
use crate::triple::{physical_triple_couplings, GaugeBasisTriples};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelStage {
    Uninitialized,
    TensorsSet,
    CouplingsComputed,
    CountertermsSet,
    TripleCouplingsComputed,
}

/// Which potential feeds the scalar mass matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOrder {
    /// V_tree plus thermal masses.
    Tree,
    /// V_tree + V_CT + V_CW plus thermal masses.
    OneLoop,
}

/// Squared masses (ascending) and rotation matrix with mass states as rows.
///
/// When the field point respects the model's block structure the rows
/// carry the model's sign conventions and `positions` maps each physical
/// label to its row. Otherwise `positions` is `None` and the rows are the
/// raw eigenvectors.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalizedMasses {
    pub masses: Vec<f64>,
    pub rotation: Vec<f64>,
    pub positions: Option<BTreeMap<String, usize>>,
}

pub struct Potential {
    model: Box<dyn ModelDefinition>,
    config: EngineConfig,
    tensors: ModelTensors,
    stage: ModelStage,
    vev: Vec<f64>,
    couplings: Option<PhysicalCouplings>,
    mixing: Option<Mixing>,
    counterterms: Option<CountertermSet>,
    triple: Option<TripleCouplings>,
    contractions: usize,
}

impl Potential {
    pub fn new(model: Box<dyn ModelDefinition>, config: EngineConfig) -> BsmptResult<Self> {
        config.validate()?;
        model.sm().validate()?;
        let n = model.n_higgs();
        let vev = model.tree_vev();
        BsmptError::check_len("tree vev", vev.len(), n)?;
        let order = model.vev_order();
        BsmptError::check_len("vev labels", model.vev_labels().len(), order.len())?;
        if let Some(&bad) = order.iter().find(|&&i| i >= n) {
            return Err(BsmptError::Dimension(format!(
                "vev order points at field {bad}, model has {n}"
            )));
        }
        let tensors = ModelTensors::new(n, model.n_gauge(), model.n_quarks(), model.n_leptons());
        Ok(Self {
            model,
            config,
            tensors,
            stage: ModelStage::Uninitialized,
            vev,
            couplings: None,
            mixing: None,
            counterterms: None,
            triple: None,
            contractions: 0,
        })
    }

    pub fn model(&self) -> &dyn ModelDefinition {
        self.model.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tensors(&self) -> &ModelTensors {
        &self.tensors
    }

    pub fn stage(&self) -> ModelStage {
        self.stage
    }

    pub fn n_higgs(&self) -> usize {
        self.tensors.n_higgs()
    }

    pub fn vev(&self) -> &[f64] {
        &self.vev
    }

    /// Number of physical triple-coupling contractions performed so far.
    pub fn contraction_count(&self) -> usize {
        self.contractions
    }

    fn require(&self, stage: ModelStage, routine: &'static str) -> BsmptResult<()> {
        if self.stage >= stage {
            return Ok(());
        }
        let requirement = match stage {
            ModelStage::Uninitialized => return Ok(()),
            ModelStage::TensorsSet => "curvature tensors not set",
            ModelStage::CouplingsComputed => "physical couplings not calculated",
            ModelStage::CountertermsSet => "counterterms not solved",
            ModelStage::TripleCouplingsComputed => "triple couplings not calculated",
        };
        log::error!("{routine}: {requirement}");
        Err(BsmptError::precondition(routine, requirement))
    }

    /// Populate the curvature tensors from the model parameters.
    /// Repeated calls are no-ops.
    pub fn set_curvature_arrays(&mut self) -> BsmptResult<()> {
        if self.stage >= ModelStage::TensorsSet {
            return Ok(());
        }
        self.model.set_curvature(&mut self.tensors)?;
        let defect = self.tensors.higgs.symmetry_defect();
        if defect > self.config.numerical_zero {
            log::warn!(
                "{}: curvature tensors deviate from index symmetry by {defect:e}",
                self.model.name()
            );
        }
        self.tensors.debye = match self.model.debye_simplified() {
            Some(debye) => debye,
            None => DebyeCorrections::from_tensors(
                &self.tensors.higgs,
                &self.tensors.gauge,
                &self.tensors.quark,
                &self.tensors.lepton,
            ),
        };
        self.stage = ModelStage::TensorsSet;
        log::debug!("{}: curvature tensors set", self.model.name());
        Ok(())
    }

    /// Move the expansion point. Couplings, counterterms and triple
    /// couplings computed at the old vacuum are discarded.
    pub fn set_vev(&mut self, vev: &[f64]) -> BsmptResult<()> {
        BsmptError::check_len("vev", vev.len(), self.n_higgs())?;
        self.vev = vev.to_vec();
        if self.stage > ModelStage::TensorsSet {
            self.stage = ModelStage::TensorsSet;
            self.tensors.counterterm.clear();
            self.couplings = None;
            self.mixing = None;
            self.counterterms = None;
            self.triple = None;
            log::debug!("{}: vacuum moved, derived results reset", self.model.name());
        }
        Ok(())
    }

    fn engine(&self) -> DerivativeEngine<'_> {
        DerivativeEngine::new(&self.tensors, &self.config, self.model.scale())
    }

    fn check_parts(&self, parts: Contributions, routine: &'static str) -> BsmptResult<()> {
        self.require(ModelStage::TensorsSet, routine)?;
        if parts.counterterm {
            self.require(ModelStage::CountertermsSet, routine)?;
        }
        Ok(())
    }

    pub fn potential(&self, fields: &[f64], parts: Contributions) -> BsmptResult<f64> {
        self.check_parts(parts, "potential")?;
        self.engine().potential(fields, parts)
    }

    pub fn first_derivative(&self, fields: &[f64], parts: Contributions) -> BsmptResult<Vec<f64>> {
        self.check_parts(parts, "first_derivative")?;
        self.engine().first_derivative(fields, parts)
    }

    pub fn second_derivative(
        &self,
        fields: &[f64],
        parts: Contributions,
    ) -> BsmptResult<Vec<f64>> {
        self.check_parts(parts, "second_derivative")?;
        self.engine().second_derivative(fields, parts)
    }

    pub fn third_derivative(&self, fields: &[f64], parts: Contributions) -> BsmptResult<Vec<f64>> {
        self.check_parts(parts, "third_derivative")?;
        self.engine().third_derivative(fields, parts)
    }

    /// Diagonalise all mass matrices at the current vacuum and classify
    /// the scalar states. Cached until the vacuum moves.
    pub fn calculate_physical_couplings(&mut self) -> BsmptResult<&PhysicalCouplings> {
        self.require(ModelStage::TensorsSet, "calculate_physical_couplings")?;
        if self.stage < ModelStage::CouplingsComputed || self.couplings.is_none() {
            let couplings = PhysicalCouplings::compute(&self.tensors, &self.vev, &self.config)?;
            let layout = self.model.mixing_layout()?;
            let mixing = classify(
                &couplings.higgs.masses,
                &couplings.higgs_rotation,
                &layout,
                &self.config,
            )
            .map_err(|e| {
                log::error!("{}: {e}", self.model.name());
                e
            })?;
            if let Some(&lightest) = mixing.masses.first() {
                if lightest <= -self.config.zero_mass_threshold {
                    log::warn!("{}: negative squared mass {lightest:e} in vacuum", self.model.name());
                }
            }
            self.couplings = Some(couplings);
            self.mixing = Some(mixing);
            self.stage = ModelStage::CouplingsComputed;
            log::debug!("{}: physical couplings calculated", self.model.name());
        }
        self.couplings.as_ref().ok_or(BsmptError::precondition(
            "calculate_physical_couplings",
            "physical couplings not calculated",
        ))
    }

    /// Classified scalar spectrum at the current vacuum.
    pub fn mixing(&mut self) -> BsmptResult<&Mixing> {
        self.calculate_physical_couplings()?;
        self.mixing.as_ref().ok_or(BsmptError::precondition(
            "mixing",
            "physical couplings not calculated",
        ))
    }

    pub fn spectrum(&mut self) -> BsmptResult<MassSpectrum> {
        Ok(self.calculate_physical_couplings()?.spectrum())
    }

    /// Scalar squared masses and rotation matrix at `fields` and
    /// temperature `temperature`.
    ///
    /// Negative squared masses are returned as they are. Rows are
    /// sign-fixed against [`ModelDefinition::mixing_layout`] whenever the
    /// mass matrix keeps the layout's blocks apart.
    pub fn diagonalize_mass_matrix(
        &self,
        fields: &[f64],
        temperature: f64,
        order: LoopOrder,
    ) -> BsmptResult<DiagonalizedMasses> {
        let parts = match order {
            LoopOrder::Tree => Contributions::TREE,
            LoopOrder::OneLoop => Contributions::ALL,
        };
        self.check_parts(parts, "diagonalize_mass_matrix")?;
        let n = self.n_higgs();
        let mut matrix = self.engine().second_derivative(fields, parts)?;
        let t2 = temperature * temperature;
        for (m, d) in matrix.iter_mut().zip(&self.tensors.debye.higgs) {
            *m += d * t2;
        }
        let eig = symmetric_eigen(&matrix, n)?;
        let mut rotation = eig.rotation_rows();
        for r in &mut rotation {
            if r.abs() < self.config.numerical_zero {
                *r = 0.0;
            }
        }
        let deviation = orthogonality_defect(&rotation, n);
        if !(deviation <= self.config.orthogonality_tolerance) {
            log::error!("diagonalize_mass_matrix: rotation matrix deviates by {deviation:e}");
            return Err(BsmptError::NonOrthogonal { deviation });
        }
        if let Some(&lightest) = eig.values.first() {
            if lightest < -self.config.zero_mass_threshold {
                log::warn!("negative squared mass {lightest:e} at T = {temperature}");
            }
        }
        let layout = self.model.mixing_layout()?;
        match classify(&eig.values, &rotation, &layout, &self.config) {
            Ok(mixing) => Ok(DiagonalizedMasses {
                masses: mixing.masses,
                rotation: mixing.rotation,
                positions: Some(mixing.positions),
            }),
            Err(BsmptError::Mixing(reason)) => {
                log::debug!("diagonalize_mass_matrix: raw eigenvectors kept ({reason})");
                Ok(DiagonalizedMasses {
                    masses: eig.values,
                    rotation,
                    positions: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Eigenvalues of ½ G·φφ + Π_gauge T².
    pub fn gauge_masses_squared(&self, fields: &[f64], temperature: f64) -> BsmptResult<Vec<f64>> {
        self.require(ModelStage::TensorsSet, "gauge_masses_squared")?;
        BsmptError::check_len("fields", fields.len(), self.n_higgs())?;
        let ng = self.tensors.gauge.n_gauge();
        let mut matrix = self.tensors.gauge.mass_matrix(fields);
        let t2 = temperature * temperature;
        for (m, d) in matrix.iter_mut().zip(&self.tensors.debye.gauge) {
            *m += d * t2;
        }
        Ok(symmetric_eigen(&matrix, ng)?.values)
    }

    /// Eigenvalues of M†M for the quark mass matrix.
    pub fn quark_masses_squared(&self, fields: &[f64]) -> BsmptResult<Vec<f64>> {
        self.require(ModelStage::TensorsSet, "quark_masses_squared")?;
        BsmptError::check_len("fields", fields.len(), self.n_higgs())?;
        let quark = &self.tensors.quark;
        hermitian_eigenvalues(&quark.squared_mass_matrix(fields), quark.n_fermion())
    }

    pub fn lepton_masses_squared(&self, fields: &[f64]) -> BsmptResult<Vec<f64>> {
        self.require(ModelStage::TensorsSet, "lepton_masses_squared")?;
        BsmptError::check_len("fields", fields.len(), self.n_higgs())?;
        let lepton = &self.tensors.lepton;
        hermitian_eigenvalues(&lepton.squared_mass_matrix(fields), lepton.n_fermion())
    }

    /// Derivatives of V_CW at the current vacuum, the input of every
    /// counterterm scheme.
    pub fn counterterm_input(&self) -> BsmptResult<CountertermInput> {
        self.require(ModelStage::CouplingsComputed, "counterterm_input")?;
        let engine = self.engine();
        Ok(CountertermInput {
            nabla: engine.first_derivative(&self.vev, Contributions::ONE_LOOP)?,
            hesse: engine.second_derivative(&self.vev, Contributions::ONE_LOOP)?,
            vev: self.vev.clone(),
        })
    }

    /// Solve the model's counterterm scheme at the current vacuum and
    /// load the counterterm tensors.
    pub fn solve_counterterms(&mut self) -> BsmptResult<CountertermSet> {
        self.require(ModelStage::TensorsSet, "solve_counterterms")?;
        self.require(ModelStage::CouplingsComputed, "solve_counterterms")?;
        if self.stage < ModelStage::CountertermsSet || self.counterterms.is_none() {
            let input = self.counterterm_input()?;
            let params = solve_counterterms(self.model.as_ref(), &input)?;
            self.tensors.counterterm.clear();
            self.model.apply(&params, &mut self.tensors.counterterm)?;
            self.counterterms = Some(CountertermSet::new(self.model.names(), params)?);
            self.stage = ModelStage::CountertermsSet;
            log::debug!("{}: counterterms set", self.model.name());
        }
        self.counterterms.clone().ok_or(BsmptError::precondition(
            "solve_counterterms",
            "counterterms not solved",
        ))
    }

    pub fn counterterm_set(&self) -> Option<&CountertermSet> {
        self.counterterms.as_ref()
    }

    /// Tree, counterterm and one-loop triple couplings of the physical
    /// states at the current vacuum.
    ///
    /// Missing couplings and counterterms are computed first. The
    /// contraction itself runs once per vacuum.
    pub fn triple_physical_couplings(&mut self) -> BsmptResult<&TripleCouplings> {
        self.set_curvature_arrays()?;
        if self.stage < ModelStage::TripleCouplingsComputed || self.triple.is_none() {
            self.calculate_physical_couplings()?;
            self.solve_counterterms()?;
            let (sorted, labels) = match &self.mixing {
                Some(mixing) => (mixing.sorted_rotation(), mixing.labels.clone()),
                None => {
                    return Err(BsmptError::precondition(
                        "triple_physical_couplings",
                        "physical couplings not calculated",
                    ))
                }
            };
            let engine = self.engine();
            let gauge = GaugeBasisTriples {
                tree: engine.third_derivative(&self.vev, Contributions::TREE)?,
                counterterm: engine.third_derivative(&self.vev, Contributions::COUNTERTERM)?,
                one_loop: engine.third_derivative(&self.vev, Contributions::ONE_LOOP)?,
            };
            let triple = physical_triple_couplings(&sorted, &labels, &gauge)?;
            self.contractions += 1;
            self.triple = Some(triple);
            self.stage = ModelStage::TripleCouplingsComputed;
            log::debug!("{}: triple couplings calculated", self.model.name());
        }
        self.triple.as_ref().ok_or(BsmptError::precondition(
            "triple_physical_couplings",
            "triple couplings not calculated",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counterterms::CountertermScheme;
    use crate::mixing::{MixingBlock, MixingLayout, SmLikeRule};
    use crate::spectral::determinant;
    use crate::tensors::CurvatureTensors;
    use bsmpt_types::SmConstants;

    /// Two decoupled real fields: V = 2x² + 4.5y² + x⁴/4.
    struct Toy {
        sm: SmConstants,
    }

    impl Toy {
        fn boxed() -> Box<dyn ModelDefinition> {
            Box::new(Toy {
                sm: SmConstants::default(),
            })
        }
    }

    impl CountertermScheme for Toy {
        fn n_params(&self) -> usize {
            4
        }

        fn names(&self) -> Vec<String> {
            ["dm1", "dm2", "dT1", "dT2"].iter().map(|s| s.to_string()).collect()
        }

        fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>> {
            let dm1 = -input.hesse(0, 0);
            let dm2 = -input.hesse(1, 1);
            Ok(vec![
                dm1,
                dm2,
                -input.nabla[0] - dm1 * input.vev[0],
                -input.nabla[1] - dm2 * input.vev[1],
            ])
        }

        fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()> {
            tensors.set_l2(0, 0, params[0]);
            tensors.set_l2(1, 1, params[1]);
            tensors.set_l1(0, params[2]);
            tensors.set_l1(1, params[3]);
            Ok(())
        }
    }

    impl ModelDefinition for Toy {
        fn name(&self) -> &str {
            "toy"
        }
        fn n_higgs(&self) -> usize {
            2
        }
        fn n_quarks(&self) -> usize {
            1
        }
        fn n_leptons(&self) -> usize {
            1
        }
        fn vev_order(&self) -> Vec<usize> {
            vec![0]
        }
        fn vev_labels(&self) -> Vec<String> {
            vec!["v".to_string()]
        }
        fn scale(&self) -> f64 {
            3.0
        }
        fn tree_vev(&self) -> Vec<f64> {
            vec![0.5, 0.0]
        }
        fn sm(&self) -> &SmConstants {
            &self.sm
        }
        fn parameters(&self) -> Vec<(String, f64)> {
            Vec::new()
        }
        fn set_curvature(&self, tensors: &mut ModelTensors) -> BsmptResult<()> {
            tensors.higgs.set_l2(0, 0, 4.0);
            tensors.higgs.set_l2(1, 1, 9.0);
            tensors.higgs.set_l4([0, 0, 0, 0], 6.0);
            Ok(())
        }
        fn mixing_layout(&self) -> BsmptResult<MixingLayout> {
            MixingLayout::new(
                2,
                vec![
                    MixingBlock::new("x", &[0], &["a"]).with_signs(&[Some(0)]),
                    MixingBlock::new("y", &[1], &["b"]).with_signs(&[Some(1)]),
                ],
                &["b", "a"],
            )
        }
    }

    /// Three real fields forming a single mixing block with a cubic
    /// self-coupling of the first one.
    struct Triplet {
        sm: SmConstants,
    }

    impl CountertermScheme for Triplet {
        fn n_params(&self) -> usize {
            3
        }

        fn names(&self) -> Vec<String> {
            ["dm1", "dm2", "dm3"].iter().map(|s| s.to_string()).collect()
        }

        fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>> {
            Ok((0..3).map(|i| -input.hesse(i, i)).collect())
        }

        fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()> {
            for (i, &dm) in params.iter().enumerate() {
                tensors.set_l2(i, i, dm);
            }
            Ok(())
        }
    }

    impl ModelDefinition for Triplet {
        fn name(&self) -> &str {
            "triplet"
        }
        fn n_higgs(&self) -> usize {
            3
        }
        fn n_quarks(&self) -> usize {
            1
        }
        fn n_leptons(&self) -> usize {
            1
        }
        fn vev_order(&self) -> Vec<usize> {
            vec![0]
        }
        fn vev_labels(&self) -> Vec<String> {
            vec!["v".to_string()]
        }
        fn scale(&self) -> f64 {
            3.0
        }
        fn tree_vev(&self) -> Vec<f64> {
            vec![0.0; 3]
        }
        fn sm(&self) -> &SmConstants {
            &self.sm
        }
        fn parameters(&self) -> Vec<(String, f64)> {
            Vec::new()
        }
        fn set_curvature(&self, tensors: &mut ModelTensors) -> BsmptResult<()> {
            let higgs = &mut tensors.higgs;
            higgs.set_l2(0, 0, 4.0);
            higgs.set_l2(1, 1, 5.0);
            higgs.set_l2(2, 2, 9.0);
            higgs.set_l2(0, 1, 1.0);
            higgs.set_l2(1, 2, -1.0);
            higgs.set_l3([0, 0, 0], 6.0);
            Ok(())
        }
        fn mixing_layout(&self) -> BsmptResult<MixingLayout> {
            MixingLayout::new(
                3,
                vec![MixingBlock::new("even", &[0, 1, 2], &["h1", "h2", "h3"])
                    .with_signs(&[Some(0), None, Some(2)])
                    .with_determinant_flip(1)
                    .with_sm_like(SmLikeRule {
                        mass: 2.3,
                        label: "h_SM".to_string(),
                        others: vec!["h_l".to_string(), "h_H".to_string()],
                    })],
                &["h1", "h2", "h3"],
            )
        }
    }

    fn triplet() -> Potential {
        let model = Box::new(Triplet {
            sm: SmConstants::default(),
        });
        let mut p = Potential::new(model, EngineConfig::default()).unwrap();
        p.set_curvature_arrays().unwrap();
        p
    }

    fn ready() -> Potential {
        let mut p = Potential::new(Toy::boxed(), EngineConfig::default()).unwrap();
        p.set_curvature_arrays().unwrap();
        p
    }

    #[test]
    fn test_derivative_before_tensors_fails() {
        let p = Potential::new(Toy::boxed(), EngineConfig::default()).unwrap();
        let err = p
            .first_derivative(&[1.0, 1.0], Contributions::TREE)
            .unwrap_err();
        assert!(
            matches!(err, BsmptError::Precondition { routine: "first_derivative", .. }),
            "{err}"
        );
        assert!(p.second_derivative(&[1.0, 1.0], Contributions::TREE).is_err());
        assert!(p.third_derivative(&[1.0, 1.0], Contributions::TREE).is_err());
    }

    #[test]
    fn test_solve_before_couplings_fails() {
        let mut p = ready();
        let err = p.solve_counterterms().unwrap_err();
        assert!(matches!(err, BsmptError::Precondition { .. }), "{err}");
        assert_eq!(p.stage(), ModelStage::TensorsSet);
    }

    #[test]
    fn test_counterterm_part_requires_solved_counterterms() {
        let p = ready();
        assert!(p.first_derivative(&[0.5, 0.0], Contributions::ALL).is_err());
        assert!(p
            .diagonalize_mass_matrix(&[0.5, 0.0], 0.0, LoopOrder::OneLoop)
            .is_err());
    }

    #[test]
    fn test_stage_progression() {
        let mut p = ready();
        p.set_curvature_arrays().unwrap();
        assert_eq!(p.stage(), ModelStage::TensorsSet);
        p.calculate_physical_couplings().unwrap();
        assert_eq!(p.stage(), ModelStage::CouplingsComputed);
        p.solve_counterterms().unwrap();
        assert_eq!(p.stage(), ModelStage::CountertermsSet);
        p.triple_physical_couplings().unwrap();
        assert_eq!(p.stage(), ModelStage::TripleCouplingsComputed);
    }

    #[test]
    fn test_counterterms_cancel_one_loop_derivatives() {
        let mut p = ready();
        p.calculate_physical_couplings().unwrap();
        p.solve_counterterms().unwrap();
        let parts = Contributions {
            tree: false,
            counterterm: true,
            one_loop: true,
        };
        let vev = p.vev().to_vec();
        let g = p.first_derivative(&vev, parts).unwrap();
        let h = p.second_derivative(&vev, parts).unwrap();
        assert!(g.iter().all(|x| x.abs() < 1e-9), "{g:?}");
        assert!(h.iter().all(|x| x.abs() < 1e-9), "{h:?}");
    }

    #[test]
    fn test_triple_couplings_are_memoised() {
        let mut p = ready();
        let first = p.triple_physical_couplings().unwrap().clone();
        assert_eq!(p.contraction_count(), 1);
        let second = p.triple_physical_couplings().unwrap().clone();
        assert_eq!(p.contraction_count(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_triple_couplings_follow_physical_order() {
        let mut p = ready();
        let triple = p.triple_physical_couplings().unwrap();
        assert_eq!(triple.labels, vec!["b".to_string(), "a".to_string()]);
        // ∂³V_tree/∂x³ = L4·x = 6·0.5 lands on the second label.
        assert!((triple.get(bsmpt_types::TriplePart::Tree, 1, 1, 1) - 3.0).abs() < 1e-12);
        assert_eq!(triple.get(bsmpt_types::TriplePart::Tree, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_set_vev_resets_derived_results() {
        let mut p = ready();
        p.triple_physical_couplings().unwrap();
        p.set_vev(&[0.7, 0.0]).unwrap();
        assert_eq!(p.stage(), ModelStage::TensorsSet);
        assert!(p.counterterm_set().is_none());
        p.triple_physical_couplings().unwrap();
        assert_eq!(p.contraction_count(), 2);
    }

    #[test]
    fn test_diagonalize_tree_level() {
        let p = ready();
        let d = p
            .diagonalize_mass_matrix(&[0.5, 0.0], 0.0, LoopOrder::Tree)
            .unwrap();
        assert!((d.masses[0] - 4.75).abs() < 1e-12);
        assert!((d.masses[1] - 9.0).abs() < 1e-12);
        assert!(orthogonality_defect(&d.rotation, 2) < 1e-10);
    }

    #[test]
    fn test_diagonalize_applies_sign_references() {
        let p = ready();
        let d = p
            .diagonalize_mass_matrix(&[0.5, 0.0], 0.0, LoopOrder::Tree)
            .unwrap();
        let positions = d.positions.unwrap();
        let (a, b) = (positions["a"], positions["b"]);
        assert_eq!(d.rotation[a * 2], 1.0);
        assert_eq!(d.rotation[b * 2 + 1], 1.0);
    }

    #[test]
    fn test_three_state_block_sign_rules() {
        let mut p = triplet();
        let mix = p.mixing().unwrap().clone();
        let rot = &mix.rotation;
        let h1 = mix.position("h1").unwrap();
        let h3 = mix.position("h3").unwrap();
        assert!(rot[h1 * 3] >= 0.0);
        assert!(rot[h3 * 3 + 2] >= 0.0);
        assert!((determinant(&mix.sorted_rotation(), 3) - 1.0).abs() < 1e-10);
        assert!(orthogonality_defect(rot, 3) < 1e-10);
    }

    #[test]
    fn test_three_state_block_sm_like_label() {
        let mut p = triplet();
        let mix = p.mixing().unwrap();
        // Masses ≈ (1.82, 2.33, 3.04)²: the middle state sits closest to 2.3.
        assert_eq!(mix.position("h_SM"), Some(1));
        assert_eq!(mix.position("h_l"), Some(0));
        assert_eq!(mix.position("h_H"), Some(2));
    }

    #[test]
    fn test_three_state_block_triple_couplings_use_fixed_rows() {
        let mut p = triplet();
        let mix = p.mixing().unwrap().clone();
        let triple = p.triple_physical_couplings().unwrap();
        for (a, &row) in mix.order.iter().enumerate() {
            let r = mix.rotation[row * 3];
            let expected = 6.0 * r * r * r;
            let got = triple.get(bsmpt_types::TriplePart::Tree, a, a, a);
            assert!((got - expected).abs() < 1e-9, "{a}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_diagonalize_matches_vacuum_mixing() {
        let mut p = triplet();
        let vev = p.vev().to_vec();
        let d = p
            .diagonalize_mass_matrix(&vev, 0.0, LoopOrder::Tree)
            .unwrap();
        let mix = p.mixing().unwrap();
        for (x, y) in d.rotation.iter().zip(&mix.rotation) {
            assert!((x - y).abs() < 1e-10, "{x} vs {y}");
        }
        assert_eq!(d.positions.as_ref(), Some(&mix.positions));
    }
}
