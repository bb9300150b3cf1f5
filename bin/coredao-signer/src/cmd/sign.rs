//! `sign` subcommand: reviews a PSBT and adds the protocol signatures.

use std::{
    fs,
    io::{self, BufRead, Write},
};

use bitcoin::Amount;
use coredao_stake_validator::{Operation, PsbtSigner, Reviewer, TransactionReview};
use tracing::{info, warn};

use crate::{
    args::{CmdContext, SubcSign},
    util::{encode_psbt, format_locktime, format_signed_sats, read_psbt},
};

fn operation_label(op: Operation) -> &'static str {
    match op {
        Operation::Stake => "Stake",
        Operation::Unstake => "Unstake",
        Operation::Restake => "Restake",
        Operation::Transfer => "Transfer",
    }
}

/// The label/value pairs shown to the user, in display order.
pub(crate) fn review_fields(review: &TransactionReview) -> Vec<(&'static str, String)> {
    let mut fields = vec![(
        "Transaction type",
        operation_label(review.operation).to_string(),
    )];

    if let Some(stake) = &review.stake {
        fields.push((
            "Stake amount",
            Amount::from_sat(stake.lock_amount_sat).to_string(),
        ));
    }
    if review.unlock_amount_sat > 0 {
        fields.push((
            "Unstake amount",
            Amount::from_sat(review.unlock_amount_sat).to_string(),
        ));
    }
    if let Some(stake) = &review.stake {
        fields.push(("Delegator", format!("0x{}", hex::encode(stake.delegator))));
        fields.push(("Validator", format!("0x{}", hex::encode(stake.validator))));
        fields.push(("Network", stake.network.to_string()));
        fields.push(("Locktime (UTC+0)", format_locktime(stake.locktime)));
        fields.push(("Core fee", stake.coredao_fee.to_string()));
    }

    fields.push(("Value spent", format_signed_sats(review.value_spent_sat)));
    fields.push(("Fee", Amount::from_sat(review.network_fee_sat).to_string()));
    fields
}

/// Prompts on a terminal and approves only on an explicit `y`.
#[derive(Debug)]
pub(crate) struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, review: &TransactionReview) -> io::Result<bool> {
        writeln!(self.output, "Review CoreDAO transaction")?;
        for (label, value) in review_fields(review) {
            writeln!(self.output, "  {label:<18} {value}")?;
        }
        write!(self.output, "Sign CoreDAO transaction? [y/N] ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn approve(&mut self, review: &TransactionReview) -> bool {
        match self.prompt(review) {
            Ok(approved) => approved,
            Err(e) => {
                warn!(err = %e, "review prompt failed, denying");
                false
            }
        }
    }
}

/// Approves every transaction that reached review.
#[derive(Debug)]
pub(crate) struct AutoApprove;

impl Reviewer for AutoApprove {
    fn approve(&mut self, review: &TransactionReview) -> bool {
        info!(operation = ?review.operation, value_spent = %review.value_spent_sat, "auto-approving");
        true
    }
}

pub(super) fn exec(cmd: SubcSign, ctx: &mut CmdContext) -> anyhow::Result<()> {
    let mut psbt = read_psbt(&cmd.psbt)?;

    let mut reviewer: Box<dyn Reviewer> = if cmd.yes || ctx.config.review.auto_approve {
        Box::new(AutoApprove)
    } else {
        Box::new(TerminalReviewer::new(io::stdin().lock(), io::stderr()))
    };

    let outcome = match PsbtSigner::new(&ctx.keys).sign(&mut psbt, reviewer.as_mut()) {
        Ok(outcome) => outcome,
        Err(rejection) => anyhow::bail!(
            "signing refused: {rejection} (status {:#06x})",
            rejection.status_word()
        ),
    };

    let encoded = encode_psbt(&psbt);
    if let Some(out_path) = &cmd.output {
        fs::write(out_path, encoded)?;
        eprintln!("wrote to file {out_path:?}");
    } else {
        println!("{encoded}");
    }
    eprintln!("signed inputs: {:?}", outcome.signed_inputs);

    Ok(())
}
