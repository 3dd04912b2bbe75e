use std::env;
use std::path::{Path, PathBuf};

use super::{DecompilationPhase, DecompilationStatus, OutputGenerationStatus};
use crate::cores::resource::{OnFailure, Resource};
use crate::errors::RetdecError;

/// A running or finished decompilation.
pub type Decompilation = Resource<DecompilationStatus>;

impl Decompilation {
    /// Completion in percent (0 to 100).
    pub fn get_completion(&mut self) -> Result<u8, RetdecError> {
        Ok(self.status()?.completion)
    }

    pub fn get_phases(&mut self) -> Result<Vec<DecompilationPhase>, RetdecError> {
        Ok(self.status()?.phases.clone())
    }

    // --- archive

    fn archive_status(&mut self) -> Result<&OutputGenerationStatus, RetdecError> {
        self.status()?.archive.get("archive")
    }

    pub fn archive_generation_has_finished(&mut self) -> Result<bool, RetdecError> {
        Ok(self.archive_status()?.finished())
    }

    pub fn archive_generation_has_succeeded(&mut self) -> Result<bool, RetdecError> {
        Ok(self.archive_status()?.generated)
    }

    pub fn archive_generation_has_failed(&mut self) -> Result<bool, RetdecError> {
        Ok(self.archive_status()?.failed)
    }

    pub fn get_archive_generation_error(&mut self) -> Result<Option<String>, RetdecError> {
        Ok(self.archive_status()?.error.clone())
    }

    pub fn wait_until_archive_is_generated(
        &mut self,
        on_failure: OnFailure,
    ) -> Result<(), RetdecError> {
        self.wait_until_generated(
            |s| s.archive.get("archive"),
            on_failure,
            RetdecError::ArchiveGenerationFailed,
        )
    }

    // --- call graph

    fn cg_status(&mut self) -> Result<&OutputGenerationStatus, RetdecError> {
        self.status()?.cg.get("cg")
    }

    pub fn cg_generation_has_finished(&mut self) -> Result<bool, RetdecError> {
        Ok(self.cg_status()?.finished())
    }

    pub fn cg_generation_has_succeeded(&mut self) -> Result<bool, RetdecError> {
        Ok(self.cg_status()?.generated)
    }

    pub fn cg_generation_has_failed(&mut self) -> Result<bool, RetdecError> {
        Ok(self.cg_status()?.failed)
    }

    pub fn get_cg_generation_error(&mut self) -> Result<Option<String>, RetdecError> {
        Ok(self.cg_status()?.error.clone())
    }

    pub fn wait_until_cg_is_generated(&mut self, on_failure: OnFailure) -> Result<(), RetdecError> {
        self.wait_until_generated(|s| s.cg.get("cg"), on_failure, RetdecError::CgGenerationFailed)
    }

    // --- control-flow graphs

    /// Functions whose CFGs were requested, sorted by name.
    pub fn funcs_with_cfg(&mut self) -> Result<Vec<String>, RetdecError> {
        Ok(self.status()?.cfgs.funcs())
    }

    fn cfg_status(&mut self, func: &str) -> Result<&OutputGenerationStatus, RetdecError> {
        self.status()?.cfgs.get(func)
    }

    pub fn cfg_generation_has_finished(&mut self, func: &str) -> Result<bool, RetdecError> {
        Ok(self.cfg_status(func)?.finished())
    }

    pub fn cfg_generation_has_succeeded(&mut self, func: &str) -> Result<bool, RetdecError> {
        Ok(self.cfg_status(func)?.generated)
    }

    pub fn cfg_generation_has_failed(&mut self, func: &str) -> Result<bool, RetdecError> {
        Ok(self.cfg_status(func)?.failed)
    }

    pub fn get_cfg_generation_error(&mut self, func: &str) -> Result<Option<String>, RetdecError> {
        Ok(self.cfg_status(func)?.error.clone())
    }

    pub fn wait_until_cfg_is_generated(
        &mut self,
        func: &str,
        on_failure: OnFailure,
    ) -> Result<(), RetdecError> {
        self.wait_until_generated(
            |s| s.cfgs.get(func),
            on_failure,
            |error| RetdecError::CfgGenerationFailed { func: func.to_string(), error },
        )
    }

    fn wait_until_generated<G, E>(
        &mut self,
        output: G,
        on_failure: OnFailure,
        default_error: E,
    ) -> Result<(), RetdecError>
    where
        G: Fn(&DecompilationStatus) -> Result<&OutputGenerationStatus, RetdecError>,
        E: FnOnce(String) -> RetdecError,
    {
        self.wait_until(|s| Ok(output(s)?.finished()))?;
        let failure = match self.snapshot() {
            Some(s) => {
                let out = output(s)?;
                out.failed.then(|| out.error.clone().unwrap_or_default())
            }
            None => None,
        };
        match failure {
            Some(message) => on_failure.handle(message, default_error),
            None => Ok(()),
        }
    }

    // --- outputs

    /// Decompiled code in the target high-level language.
    pub fn get_hll_code(&self) -> Result<String, RetdecError> {
        self.get_file("outputs/hll")?.read_text()
    }

    /// Disassembled code.
    pub fn get_dsm_code(&self) -> Result<String, RetdecError> {
        self.get_file("outputs/dsm")?.read_text()
    }

    /// Binary compiled from a C input.
    pub fn get_binary(&self) -> Result<Vec<u8>, RetdecError> {
        self.get_file("outputs/binary")?.read_bytes()
    }

    pub fn save_hll_code(&self, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output("outputs/hll", dir)
    }

    pub fn save_dsm_code(&self, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output("outputs/dsm", dir)
    }

    pub fn save_archive(&self, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output("outputs/archive", dir)
    }

    pub fn save_binary(&self, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output("outputs/binary", dir)
    }

    pub fn save_cg(&self, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output("outputs/cg", dir)
    }

    pub fn save_cfg(&self, func: &str, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        self.save_output(&format!("outputs/cfgs/{}", func), dir)
    }

    /// Saves into `dir`, or the current directory when `None`.
    fn save_output(&self, path: &str, dir: Option<&Path>) -> Result<PathBuf, RetdecError> {
        let dir = match dir {
            Some(d) => d.to_path_buf(),
            None => env::current_dir()?,
        };
        self.get_file(path)?.save_into(&dir)
    }
}
