//! OTP email content.

use crate::shared::planner::OtpChannel;

/// Subject and HTML body for one OTP email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEmail {
    pub subject: String,
    pub html: String,
}

impl OtpEmail {
    pub fn new(channel: OtpChannel, otp: &str, reference: &str) -> Self {
        Self {
            subject: Self::subject(channel).to_string(),
            html: Self::render(otp, reference),
        }
    }

    pub fn subject(channel: OtpChannel) -> &'static str {
        match channel {
            OtpChannel::Verify => "รหัส OTP สำหรับยืนยันตัวตนบัญชีอีเมล",
            OtpChannel::ResetPassword => "รหัส OTP สำหรับรีเซ็ตรหัสผ่าน",
        }
    }

    /// HTML body carrying the code and its reference
    pub fn render(otp: &str, reference: &str) -> String {
        format!(
            r##"<table width="680px" cellpadding="0" cellspacing="0" border="0">
  <tbody>
    <tr>
      <td bgcolor="#eeeeee" align="center"><h1>Myday-Planner</h1></td>
    </tr>
    <tr>
      <td bgcolor="#ffffff" align="center" style="line-height:24px">
        <font color="#333333" face="Arial"><span style="font-size:20px">สวัสดี!</span></font><br>
        <font color="#333333" face="Arial"><span style="font-size:16px">กรุณานำรหัส OTP ด้านล่าง ไปกรอกในหน้ายืนยัน.</span></font>
      </td>
    </tr>
    <tr>
      <td bgcolor="#ffffff" align="center" style="font-size:18px;color:#c00;font-family:Arial">
        OTP : <strong style="color:#000">{otp}</strong>
      </td>
    </tr>
    <tr>
      <td bgcolor="#ffffff" align="center" style="font-size:18px;color:#c00;font-family:Arial">
        Ref : <strong style="color:#000">{reference}</strong>
      </td>
    </tr>
  </tbody>
</table>"##
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_contains_code_and_reference() {
        let email = OtpEmail::new(OtpChannel::Verify, "482913", "Ab3dE6gH9k");
        assert!(email.html.contains("482913"));
        assert!(email.html.contains("Ab3dE6gH9k"));
    }

    #[test]
    fn test_subject_depends_on_channel() {
        assert_ne!(
            OtpEmail::subject(OtpChannel::Verify),
            OtpEmail::subject(OtpChannel::ResetPassword)
        );
    }
}
