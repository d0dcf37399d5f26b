//! Bundled sample reports covering the three risk bands, used by the CLI
//! demo.

use chrono::{Duration, Utc};
use pix_triage::reports::{
    AnalysisMetadata, DeviceContext, EvidenceAttachment, FraudAssessment, InitiationChannel,
    Payee, PayeeAccount, Payer, ReportId, ReportSubmission, RiskProfile, Transaction,
};

pub(crate) fn all() -> Vec<(&'static str, ReportSubmission)> {
    vec![
        ("low-risk", low_risk()),
        ("medium-risk", medium_risk()),
        ("high-risk", high_risk()),
    ]
}

pub(crate) fn low_risk() -> ReportSubmission {
    let now = Utc::now();
    ReportSubmission {
        report_id: ReportId("DEMO-LOW-001".to_string()),
        reported_at: now,
        transaction: Transaction {
            end_to_end_id: "E12345678202401010000000000000001".to_string(),
            tx_id: "TXN12345678901234567890123456789012".to_string(),
            amount: 150.0,
            occurred_at: now - Duration::hours(2),
            initiation: InitiationChannel::QrCode,
        },
        payer: Payer {
            tax_id: "12345678901".to_string(),
            name: "João Silva Santos".to_string(),
            branch: "1234".to_string(),
            account_number: "567890".to_string(),
            institution: "Banco do Brasil".to_string(),
            risk_profile: RiskProfile::Low,
        },
        payee: Payee {
            tax_id: "98765432100".to_string(),
            name: "Maria Oliveira Costa".to_string(),
            pix_key: "maria.oliveira@email.com".to_string(),
            institution: "Nubank".to_string(),
            account: PayeeAccount {
                branch: "0001".to_string(),
                number: "12345678".to_string(),
                opened_at: now - Duration::days(1500),
                risk_score: 850,
            },
        },
        assessment: FraudAssessment {
            reason: "Unauthorized transaction".to_string(),
            scam_subtype: "Card cloning".to_string(),
            narrative: "Recebi uma notificação de PIX que não realizei, para uma pessoa que \
                        não conheço."
                .to_string(),
            evidence: vec![EvidenceAttachment {
                kind: "print_tela".to_string(),
                url: "https://example.com/evidencia1.jpg".to_string(),
            }],
        },
        metadata: AnalysisMetadata {
            prior_payee_reports: 0,
            payee_average_amount: 200.0,
            payer_history_consistent: true,
            device: DeviceContext {
                device_id: "DEV123456789".to_string(),
                ip_address: "192.168.1.100".to_string(),
                new_device: false,
            },
        },
    }
}

pub(crate) fn medium_risk() -> ReportSubmission {
    let now = Utc::now();
    ReportSubmission {
        report_id: ReportId("DEMO-MED-002".to_string()),
        reported_at: now,
        transaction: Transaction {
            end_to_end_id: "E12345678202401010000000000000002".to_string(),
            tx_id: "TXN12345678901234567890123456789013".to_string(),
            amount: 2_500.0,
            occurred_at: now - Duration::minutes(30),
            initiation: InitiationChannel::PixKey,
        },
        payer: Payer {
            tax_id: "11122233344".to_string(),
            name: "Carlos Eduardo Ferreira".to_string(),
            branch: "5678".to_string(),
            account_number: "901234".to_string(),
            institution: "Itaú".to_string(),
            risk_profile: RiskProfile::Medium,
        },
        payee: Payee {
            tax_id: "44455566677".to_string(),
            name: "Ana Paula Rodrigues".to_string(),
            pix_key: "+5511999888777".to_string(),
            institution: "Bradesco".to_string(),
            account: PayeeAccount {
                branch: "1234".to_string(),
                number: "87654321".to_string(),
                opened_at: now - Duration::days(60),
                risk_score: 450,
            },
        },
        assessment: FraudAssessment {
            reason: "Social engineering scam".to_string(),
            scam_subtype: "Fake store".to_string(),
            narrative: "Comprei um produto que nunca chegou e o vendedor parou de responder."
                .to_string(),
            evidence: vec![EvidenceAttachment {
                kind: "print_conversa".to_string(),
                url: "https://example.com/evidencia2.jpg".to_string(),
            }],
        },
        metadata: AnalysisMetadata {
            prior_payee_reports: 1,
            payee_average_amount: 1_000.0,
            payer_history_consistent: true,
            device: DeviceContext {
                device_id: "DEV987654321".to_string(),
                ip_address: "177.32.45.10".to_string(),
                new_device: true,
            },
        },
    }
}

pub(crate) fn high_risk() -> ReportSubmission {
    let now = Utc::now();
    ReportSubmission {
        report_id: ReportId("DEMO-HIGH-003".to_string()),
        reported_at: now,
        transaction: Transaction {
            end_to_end_id: "E12345678202401010000000000000003".to_string(),
            tx_id: "TXN12345678901234567890123456789014".to_string(),
            amount: 50_000.0,
            occurred_at: now - Duration::minutes(10),
            initiation: InitiationChannel::PixKey,
        },
        payer: Payer {
            tax_id: "55566677788".to_string(),
            name: "Fernanda Lima Souza".to_string(),
            branch: "9012".to_string(),
            account_number: "345678".to_string(),
            institution: "Santander".to_string(),
            risk_profile: RiskProfile::High,
        },
        payee: Payee {
            tax_id: "22233344455".to_string(),
            name: "Roberto Carlos Almeida".to_string(),
            pix_key: "roberto.fraude@email.com".to_string(),
            institution: "Banco Digital X".to_string(),
            account: PayeeAccount {
                branch: "0002".to_string(),
                number: "99887766".to_string(),
                opened_at: now - Duration::hours(6),
                risk_score: 15,
            },
        },
        assessment: FraudAssessment {
            reason: "Account takeover".to_string(),
            scam_subtype: "Fake bank manager".to_string(),
            narrative: "O gerente ligou dizendo que minha conta foi invadida e que era urgente \
                        confirmar minha senha e o token."
                .to_string(),
            evidence: vec![EvidenceAttachment {
                kind: "gravacao_ligacao".to_string(),
                url: "https://example.com/evidencia3.mp3".to_string(),
            }],
        },
        metadata: AnalysisMetadata {
            prior_payee_reports: 8,
            payee_average_amount: 35_000.0,
            payer_history_consistent: false,
            device: DeviceContext {
                device_id: "DEV000111222".to_string(),
                ip_address: "201.17.89.204".to_string(),
                new_device: true,
            },
        },
    }
}
